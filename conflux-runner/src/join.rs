//! Collecting spawned children back into one result.

use conflux_core::{Action, ActionError};
use std::any::Any;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

type ChildResult = Result<(), ActionError>;

/// Tasks spawned for one run of a concurrent runner.
///
/// Dropping the set aborts every child that has not finished, so a caller
/// that abandons the run (a timeout, a dropped future) does not leave
/// children mutating the run state behind its back.
pub(crate) struct Children {
    runner: &'static str,
    handles: Vec<JoinHandle<ChildResult>>,
}

impl Children {
    pub(crate) fn new(runner: &'static str, capacity: usize) -> Self {
        Self {
            runner,
            handles: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ChildResult> + Send + 'static,
    {
        self.handles.push(tokio::spawn(task));
    }

    /// Await every child, in submission order, and reduce to one result.
    ///
    /// `actions` must line up with the spawned children. Every child is
    /// awaited even after a failure. The first genuine error in submission
    /// order is returned, wrapped with the child's name; skip-remainder
    /// results count as success.
    pub(crate) async fn join(mut self, actions: &[Arc<dyn Action>]) -> ChildResult {
        debug_assert_eq!(actions.len(), self.handles.len());
        let runner = self.runner;
        let mut first: Option<ActionError> = None;

        for (action, handle) in actions.iter().zip(self.handles.iter_mut()) {
            let err = match handle.await {
                Ok(Ok(())) | Ok(Err(ActionError::SkipRemainder)) => continue,
                Ok(Err(err)) => err.in_action(action.name()),
                Err(join_err) => ActionError::Panicked {
                    action: action.name().to_owned(),
                    message: join_message(join_err),
                },
            };
            tracing::warn!(
                runner,
                action = action.name(),
                error = %err,
                "conflux.child.failed"
            );
            if first.is_none() {
                first = Some(err);
            }
        }

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for Children {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn join_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "task was cancelled".to_owned();
    }
    match err.try_into_panic() {
        Ok(payload) => panic_message(payload.as_ref()),
        Err(err) => err.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
