//! RecordingAction and SleepAction — scripted leaves for runner tests.

use super::CallLog;
use crate::action::Action;
use crate::context::ExecContext;
use crate::error::ActionError;
use crate::state::RunState;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Outcome {
    Succeed,
    Fail(String),
    Skip,
}

/// An action that appends its name to a [`CallLog`] and then returns a
/// scripted outcome.
///
/// The log entry is the action's only side effect. With
/// [`honoring_cancel`](Self::honoring_cancel) the action checks its context
/// right before recording and, if canceled, returns `Ok(())` without
/// recording anything.
#[derive(Debug, Clone)]
pub struct RecordingAction {
    name: String,
    log: CallLog,
    outcome: Outcome,
    honor_cancel: bool,
    delay: Option<Duration>,
}

impl RecordingAction {
    /// An action that records `name` and succeeds.
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            outcome: Outcome::Succeed,
            honor_cancel: false,
            delay: None,
        }
    }

    /// Record, then fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Fail(message.into());
        self
    }

    /// Record, then return [`ActionError::SkipRemainder`].
    pub fn skipping(mut self) -> Self {
        self.outcome = Outcome::Skip;
        self
    }

    /// Do nothing if the context is already canceled when the work would start.
    pub fn honoring_cancel(mut self) -> Self {
        self.honor_cancel = true;
        self
    }

    /// Sleep for `delay` before recording.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Action for RecordingAction {
    async fn run(&self, ctx: &ExecContext, _state: &RunState) -> Result<(), ActionError> {
        let _running = self.log.enter();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.honor_cancel && ctx.is_cancelled() {
            return Ok(());
        }
        self.log.record(self.name.as_str());
        match &self.outcome {
            Outcome::Succeed => Ok(()),
            Outcome::Fail(message) => Err(ActionError::msg(message.clone())),
            Outcome::Skip => Err(ActionError::SkipRemainder),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An action that sleeps for a fixed duration, cut short by cancellation.
///
/// Returns [`ActionError::Cancelled`] if the context fires first.
#[derive(Debug, Clone)]
pub struct SleepAction {
    duration: Duration,
}

impl SleepAction {
    /// Sleep for `duration`.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Action for SleepAction {
    async fn run(&self, ctx: &ExecContext, _state: &RunState) -> Result<(), ActionError> {
        tokio::select! {
            _ = tokio::time::sleep(self.duration) => Ok(()),
            _ = ctx.cancelled() => Err(ActionError::Cancelled),
        }
    }

    fn name(&self) -> &str {
        "sleep"
    }
}
