//! CallLog — ordered record of which actions ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Thread-safe, ordered log of action invocations.
///
/// Clones share one log. Besides the order of calls it tracks how many
/// recorded actions were in flight at once, which is what throttling tests
/// assert on.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one call.
    pub fn record(&self, name: impl Into<String>) {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.into());
    }

    /// Snapshot of all calls so far, in the order they were recorded.
    pub fn calls(&self) -> Vec<String> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark one action as running until the returned guard drops.
    pub fn enter(&self) -> InFlight {
        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight {
            log: self.inner.clone(),
        }
    }

    /// Highest number of simultaneously running actions observed.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Guard returned by [`CallLog::enter`].
#[derive(Debug)]
pub struct InFlight {
    log: Arc<Inner>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
