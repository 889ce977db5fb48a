//! Async — run every child concurrently.

use crate::join::Children;
use async_trait::async_trait;
use conflux_core::{Action, ActionError, ExecContext, RunState};
use std::sync::Arc;

/// Spawns every child onto its own tokio task and waits for all of them.
///
/// Children share the caller's context and run state unchanged; order
/// between them is whatever the scheduler makes of it. A failure does not
/// abandon the other children: the runner waits for everything, then
/// returns the first genuine error in submission order.
///
/// [`ActionError::SkipRemainder`] has nothing left to stop here (every child
/// is already running by the time one could return it), so it is treated as
/// success and siblings are not canceled.
///
/// Dropping the future returned by `run` before it completes aborts every
/// child that is still running; they stop at their next `.await`.
#[derive(Clone, Default)]
pub struct Async {
    actions: Vec<Arc<dyn Action>>,
}

impl Async {
    /// Compose `actions` to run concurrently.
    pub fn new(actions: impl IntoIterator<Item = Arc<dyn Action>>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    /// Add one more child.
    pub fn push(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Arc::new(action));
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True when there are no children.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[async_trait]
impl Action for Async {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        tracing::debug!(children = self.actions.len(), "conflux.async.dispatch");

        let mut children = Children::new("async", self.actions.len());
        for action in &self.actions {
            let action = Arc::clone(action);
            let ctx = ctx.clone();
            let state = state.clone();
            children.spawn(async move { action.run(&ctx, &state).await });
        }

        children.join(&self.actions).await
    }

    fn name(&self) -> &str {
        "async"
    }
}

impl std::fmt::Debug for Async {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("Async").field("actions", &names).finish()
    }
}
