//! Scripted actions for testing compositions.
//!
//! Available behind the `test-utils` feature flag. Runner tests build
//! pipelines out of these and assert on the shared [`CallLog`].

mod call_log;
mod recording_action;

pub use call_log::{CallLog, InFlight};
pub use recording_action::{RecordingAction, SleepAction};
