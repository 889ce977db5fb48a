#![deny(missing_docs)]
//! # conflux — umbrella crate
//!
//! One import surface for the conflux crates. The action contract is always
//! available; runners and the future/promise cell sit behind the `runner`
//! and `future` features (both on by default).
//!
//! ```no_run
//! use conflux::prelude::*;
//! use std::num::NonZeroUsize;
//!
//! # async fn demo() -> Result<(), ActionError> {
//! let fetch = FnAction::named("fetch", |_ctx, state| async move {
//!     state.insert("payload", vec![1u8, 2, 3]);
//!     Ok(())
//! });
//! let checks = ThrottledAsync::new(
//!     NonZeroUsize::new(2).unwrap(),
//!     [
//!         FnAction::named("lint", |_ctx, _state| async { Ok(()) }).arc(),
//!         FnAction::named("test", |_ctx, _state| async { Ok(()) }).arc(),
//!     ],
//! );
//! let pipeline = Linear::new([fetch.arc(), checks.arc()]);
//! pipeline.run(&ExecContext::new(), &RunState::new()).await
//! # }
//! ```

pub use conflux_core;
#[cfg(feature = "future")]
pub use conflux_future;
#[cfg(feature = "runner")]
pub use conflux_runner;

/// Happy-path imports for building compositions.
///
/// The future/promise types are left out so they do not shadow
/// `std::future::Future`; import them from `conflux_future` by path.
pub mod prelude {
    pub use conflux_core::{Action, ActionError, ActionExt, ExecContext, FnAction, RunState};

    #[cfg(feature = "runner")]
    pub use conflux_runner::{Async, Linear, ThrottleConfig, ThrottledAsync};
}
