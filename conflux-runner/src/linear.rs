//! Linear — run children one after another.

use async_trait::async_trait;
use conflux_core::{Action, ActionError, ExecContext, RunState};
use std::sync::Arc;

/// Runs children strictly in order on the caller's task.
///
/// Fail-fast: the first genuine error stops the run and is returned wrapped
/// with the child's name. A child returning
/// [`ActionError::SkipRemainder`] also stops the run, but the result is
/// `Ok(())`.
#[derive(Clone, Default)]
pub struct Linear {
    actions: Vec<Arc<dyn Action>>,
}

impl Linear {
    /// Compose `actions` in the given order.
    pub fn new(actions: impl IntoIterator<Item = Arc<dyn Action>>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    /// Append one more child.
    pub fn push(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// Builder form of [`push`](Self::push).
    pub fn then(mut self, action: impl Action + 'static) -> Self {
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
impl Action for Linear {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        tracing::debug!(children = self.actions.len(), "conflux.linear.start");

        for (index, action) in self.actions.iter().enumerate() {
            match action.run(ctx, state).await {
                Ok(()) => {}
                Err(ActionError::SkipRemainder) => {
                    tracing::debug!(index, action = action.name(), "conflux.linear.skip");
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(
                        index,
                        action = action.name(),
                        error = %err,
                        "conflux.linear.failed"
                    );
                    return Err(err.in_action(action.name()));
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "linear"
    }
}

impl std::fmt::Debug for Linear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("Linear").field("actions", &names).finish()
    }
}
