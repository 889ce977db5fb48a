//! Property-based tests: ordering and stop semantics of the ordered runners.

use conflux_core::test_utils::{CallLog, RecordingAction};
use conflux_core::{Action, ActionExt, ExecContext, RunState};
use conflux_runner::{Linear, ThrottledAsync};
use proptest::prelude::*;
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Stop {
    Fail,
    Skip,
}

fn arb_plan() -> impl Strategy<Value = (usize, Option<(usize, Stop)>)> {
    (0usize..12).prop_flat_map(|n| {
        let stop = if n == 0 {
            Just(None).boxed()
        } else {
            proptest::option::of((0..n, prop_oneof![Just(Stop::Fail), Just(Stop::Skip)])).boxed()
        };
        (Just(n), stop)
    })
}

fn build(n: usize, stop: Option<(usize, Stop)>, log: &CallLog) -> Vec<Arc<dyn Action>> {
    (0..n)
        .map(|i| {
            let action = RecordingAction::new(format!("step-{i}"), log).honoring_cancel();
            let action = match stop {
                Some((at, Stop::Fail)) if at == i => action.failing(format!("step-{i} failed")),
                Some((at, Stop::Skip)) if at == i => action.skipping(),
                _ => action,
            };
            action.arc()
        })
        .collect()
}

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

fn names(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("step-{i}")).collect()
}

proptest! {
    #[test]
    fn linear_order_and_stop_position((n, stop) in arb_plan()) {
        let log = CallLog::new();
        let linear = Linear::new(build(n, stop, &log));
        let result = block_on(linear.run(&ExecContext::new(), &RunState::new()));

        match stop {
            None => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(log.calls(), names(0..n));
            }
            Some((at, Stop::Skip)) => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(log.calls(), names(0..at + 1));
            }
            Some((at, Stop::Fail)) => {
                let err = result.unwrap_err();
                prop_assert_eq!(err.root().to_string(), format!("step-{at} failed"));
                prop_assert_eq!(log.calls(), names(0..at + 1));
            }
        }
    }

    #[test]
    fn throttled_one_matches_linear((n, stop) in arb_plan()) {
        let log = CallLog::new();
        let throttled = ThrottledAsync::new(NonZeroUsize::MIN, build(n, stop, &log));
        let result = block_on(throttled.run(&ExecContext::new(), &RunState::new()));

        match stop {
            None => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(log.calls(), names(0..n));
            }
            Some((at, Stop::Skip)) => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(log.calls(), names(0..at + 1));
            }
            Some((at, Stop::Fail)) => {
                // Same error as Linear; later children still run, in order.
                let err = result.unwrap_err();
                let failing = format!("step-{at}");
                prop_assert_eq!(err.root().to_string(), format!("step-{at} failed"));
                prop_assert_eq!(err.action(), Some(failing.as_str()));
                prop_assert_eq!(log.calls(), names(0..n));
            }
        }
    }
}
