//! # conflux-core — the action contract
//!
//! This crate defines the pieces every conflux composition is built from.
//!
//! | Piece | Type | What it does |
//! |-------|------|-------------|
//! | Action | [`Action`], [`FnAction`] | One unit of work, run once per invocation |
//! | Run state | [`RunState`] | Key-value context shared by every action in one run |
//! | Execution context | [`ExecContext`] | Cancellation and deadline, propagated to every action |
//! | Errors | [`ActionError`] | Genuine failures plus the skip-remainder sentinel |
//!
//! The runners that compose actions (`Linear`, `Async`, `ThrottledAsync`)
//! live in `conflux-runner`. They are themselves [`Action`]s, so
//! compositions nest freely and every level sees the same [`RunState`].
//!
//! ## Async traits
//!
//! [`Action`] uses `async-trait` so that `Arc<dyn Action>` stays object-safe
//! with `Send` futures. Runners spawn children onto tokio tasks, which is why
//! the context and the state are cheap clonable handles rather than borrows
//! with a lifetime.

#![deny(missing_docs)]

pub mod action;
pub mod context;
pub mod error;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use action::{run, run_with_state, Action, ActionExt, FnAction};
pub use context::ExecContext;
pub use error::ActionError;
pub use state::RunState;
