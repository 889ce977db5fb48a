#![deny(missing_docs)]
//! Runners that compose conflux actions.
//!
//! Each runner is itself an [`Action`](conflux_core::Action) over a list of
//! children, so runners nest and share one `RunState` through the whole tree.
//!
//! | Runner | Dispatch | On genuine error | On skip-remainder |
//! |--------|----------|------------------|-------------------|
//! | [`Linear`] | in order, on the caller's task | stop, return it | stop, return `Ok` |
//! | [`Async`] | all at once via `tokio::spawn` | wait for all, return one | ignored |
//! | [`ThrottledAsync`] | at most N at once, in order | wait for all, return one | cancel the shared child context |
//!
//! Errors from children come back wrapped in
//! [`ActionError::Failed`](conflux_core::ActionError::Failed) naming the
//! child; use [`ActionError::root`](conflux_core::ActionError::root) to
//! compare against the original error.
//!
//! Concurrent runners spawn onto the ambient tokio runtime and must be run
//! from within one.

mod config;
mod join;
mod linear;
mod parallel;
mod throttled;

pub use config::{ConfigError, ThrottleConfig, ENV_MAX_CONCURRENCY};
pub use linear::Linear;
pub use parallel::Async;
pub use throttled::ThrottledAsync;
