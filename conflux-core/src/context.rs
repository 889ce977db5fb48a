//! Execution context: cancellation plus an optional deadline.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellation-capable handle passed to every action invocation.
///
/// Cloning is cheap and clones share one cancellation state. [`child`]
/// derives a context that can be canceled on its own but is also canceled
/// whenever its parent is; cancellation never flows upward.
///
/// A deadline is enforced by a timer task that cancels the token when it
/// expires, so waiting on [`cancelled`] needs no runtime of its own. The
/// timer lives as long as the context: once the last clone of a timed
/// context (and of every context derived from it) is dropped, its token is
/// canceled and the timer task exits.
///
/// [`child`]: ExecContext::child
/// [`cancelled`]: ExecContext::cancelled
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    timer: Option<Arc<DeadlineTimer>>,
}

/// Keeps a deadline timer alive, along with the timers of the contexts it
/// was derived from.
#[derive(Debug)]
struct DeadlineTimer {
    _guard: DropGuard,
    _parent: Option<Arc<DeadlineTimer>>,
}

impl ExecContext {
    /// A fresh, live context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one owned by a server's shutdown logic.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            timer: None,
        }
    }

    /// Derive a context that is canceled at `deadline` at the latest.
    ///
    /// The earlier of `deadline` and any inherited deadline wins.
    ///
    /// # Panics
    ///
    /// Spawns the deadline timer with `tokio::spawn`, so it must be called
    /// from within a tokio runtime.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(inherited) if inherited <= deadline => inherited,
            _ => deadline,
        };
        let token = self.token.child_token();

        let timer_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => timer_token.cancel(),
                _ = timer_token.cancelled() => {}
            }
        });

        let timer = DeadlineTimer {
            _guard: token.clone().drop_guard(),
            _parent: self.timer.clone(),
        };
        Self {
            token,
            deadline: Some(deadline),
            timer: Some(Arc::new(timer)),
        }
    }

    /// Derive a context that is canceled after `timeout`.
    ///
    /// # Panics
    ///
    /// Same as [`with_deadline`](Self::with_deadline).
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive an independently cancellable context that follows this one.
    ///
    /// The child inherits the deadline and keeps its timer alive.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            timer: self.timer.clone(),
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once canceled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves when the context is canceled or its deadline passes.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token, for handing to tokio-util aware code.
    ///
    /// For a timed context the token is also canceled once the context and
    /// everything derived from it has been dropped.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for ExecContext {
    fn from(token: CancellationToken) -> Self {
        Self::from_token(token)
    }
}
