//! ThrottledAsync — run children concurrently under a fixed limit.

use crate::config::{ConfigError, ThrottleConfig};
use crate::join::Children;
use async_trait::async_trait;
use conflux_core::{Action, ActionError, ExecContext, RunState};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Spawns children onto tokio tasks with at most `limit` running at once.
///
/// Admission is in submission order: the dispatcher takes one permit from a
/// semaphore of `limit` permits before spawning each child, and the child
/// releases it when it finishes. With a limit of one this reproduces
/// [`Linear`](crate::Linear) ordering, each child on its own task.
///
/// All children share a context derived from the caller's. When a child
/// returns [`ActionError::SkipRemainder`] that derived context is canceled
/// before the child's permit is released, so every child admitted later
/// starts with a canceled context. Cancellation is advisory: later children
/// are still started, and it is up to them to check
/// [`ExecContext::is_cancelled`] and return early. The caller's own context
/// is never canceled.
///
/// Errors are reported as in [`Async`](crate::Async). Dropping the future
/// returned by `run` aborts every admitted child that is still running and
/// admits no more.
#[derive(Clone)]
pub struct ThrottledAsync {
    limit: NonZeroUsize,
    actions: Vec<Arc<dyn Action>>,
}

impl ThrottledAsync {
    /// Compose `actions` with at most `limit` running at once.
    pub fn new(limit: NonZeroUsize, actions: impl IntoIterator<Item = Arc<dyn Action>>) -> Self {
        Self {
            limit,
            actions: actions.into_iter().collect(),
        }
    }

    /// Like [`new`](Self::new), rejecting a limit of zero.
    pub fn try_new(
        limit: usize,
        actions: impl IntoIterator<Item = Arc<dyn Action>>,
    ) -> Result<Self, ConfigError> {
        let limit = NonZeroUsize::new(limit).ok_or(ConfigError::InvalidConcurrency(limit))?;
        Ok(Self::new(limit, actions))
    }

    /// Build from a validated [`ThrottleConfig`].
    pub fn from_config(
        config: &ThrottleConfig,
        actions: impl IntoIterator<Item = Arc<dyn Action>>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(config.validate()?, actions))
    }

    /// Add one more child, admitted after the existing ones.
    pub fn push(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// The concurrency limit.
    pub fn limit(&self) -> NonZeroUsize {
        self.limit
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
impl Action for ThrottledAsync {
    async fn run(&self, ctx: &ExecContext, state: &RunState) -> Result<(), ActionError> {
        let limit = self.limit.get();
        tracing::debug!(limit, children = self.actions.len(), "conflux.throttled.dispatch");

        let gate = Arc::new(Semaphore::new(limit));
        let scope = ctx.child();
        let mut children = Children::new("throttled", self.actions.len());

        for (index, action) in self.actions.iter().enumerate() {
            // Only a closed gate fails to admit, and this one is never closed.
            let permit = Arc::clone(&gate)
                .acquire_owned()
                .await
                .map_err(|_| ActionError::msg("admission gate closed"))?;
            tracing::trace!(index, action = action.name(), "conflux.throttled.admit");

            let action = Arc::clone(action);
            let scope = scope.clone();
            let state = state.clone();
            children.spawn(async move {
                let result = action.run(&scope, &state).await;
                if matches!(result, Err(ActionError::SkipRemainder)) {
                    tracing::debug!(index, action = action.name(), "conflux.throttled.skip");
                    scope.cancel();
                }
                drop(permit);
                result
            });
        }

        children.join(&self.actions).await
    }

    fn name(&self) -> &str {
        "throttled-async"
    }
}

impl std::fmt::Debug for ThrottledAsync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("ThrottledAsync")
            .field("limit", &self.limit)
            .field("actions", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_rejected() {
        let err = ThrottledAsync::try_new(0, Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConcurrency(0)));
        assert_eq!(ThrottledAsync::try_new(3, Vec::new()).unwrap().limit().get(), 3);
    }

    #[tokio::test]
    async fn empty_composition_succeeds() {
        let runner = ThrottledAsync::try_new(2, Vec::new()).unwrap();
        assert!(runner.is_empty());
        assert!(runner.run(&ExecContext::new(), &RunState::new()).await.is_ok());
    }
}
