#![deny(missing_docs)]
//! Single-assignment value cell with read-only views.
//!
//! A [`Future`] starts pending and is settled at most once, either with a
//! value ([`Future::set`]) or by cancellation ([`Future::cancel`]). The first
//! of the two wins; later calls are no-ops. Any number of [`Promise`]s can be
//! handed out to consumers, which can read and wait but never settle.
//!
//! ```
//! use conflux_future::Future;
//!
//! let future = Future::new();
//! let promise = future.promise();
//!
//! let producer = std::thread::spawn(move || {
//!     future.set(42u32);
//! });
//! assert_eq!(promise.wait(), Some(42));
//! producer.join().unwrap();
//! ```
//!
//! Results are `Option<T>`: `None` means no value, either not yet (from
//! [`get`](Future::get)) or never (from the waits, after cancellation).
//!
//! The blocking waits park the calling thread. From async code use the
//! `_async` forms instead.

mod promise;

pub use promise::Promise;

use conflux_core::ExecContext;
use std::fmt;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub(crate) enum Slot<T> {
    Pending,
    Set(T),
    Canceled,
}

impl<T: Clone> Slot<T> {
    pub(crate) fn is_settled(&self) -> bool {
        !matches!(self, Slot::Pending)
    }

    pub(crate) fn value(&self) -> Option<T> {
        match self {
            Slot::Set(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Write side of a single-assignment cell.
///
/// Owned by the producer. Consumers get [`Promise`]s from
/// [`promise`](Self::promise). Dropping a still-pending `Future` leaves its
/// promises permanently without a value: their waits return `None`.
pub struct Future<T> {
    tx: watch::Sender<Slot<T>>,
    view: Promise<T>,
}

impl<T: Clone> Future<T> {
    /// A pending future.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(Slot::Pending);
        Self {
            tx,
            view: Promise::from_receiver(rx),
        }
    }

    /// Settle with `value` if still pending. Returns true if this call settled it.
    pub fn set(&self, value: T) -> bool {
        let settled = self.tx.send_if_modified(|slot| match slot {
            Slot::Pending => {
                *slot = Slot::Set(value);
                true
            }
            _ => false,
        });
        if settled {
            tracing::trace!("conflux.future.settled");
        }
        settled
    }

    /// Cancel if still pending. Returns true if this call canceled it.
    pub fn cancel(&self) -> bool {
        let canceled = self.tx.send_if_modified(|slot| match slot {
            Slot::Pending => {
                *slot = Slot::Canceled;
                true
            }
            _ => false,
        });
        if canceled {
            tracing::trace!("conflux.future.canceled");
        }
        canceled
    }

    /// A read-only view of this future.
    pub fn promise(&self) -> Promise<T> {
        self.view.clone()
    }

    /// True once [`set`](Self::set) has completed.
    pub fn is_set(&self) -> bool {
        self.view.is_set()
    }

    /// True once canceled before any value was set.
    pub fn is_canceled(&self) -> bool {
        self.view.is_canceled()
    }

    /// The value, if set. Never blocks.
    pub fn get(&self) -> Option<T> {
        self.view.get()
    }

    /// Block the calling thread until settled. `None` after cancellation.
    ///
    /// Do not call from inside an async task; use [`wait_async`](Self::wait_async).
    pub fn wait(&self) -> Option<T> {
        self.view.wait()
    }

    /// Wait until settled without blocking the thread.
    pub async fn wait_async(&self) -> Option<T> {
        self.view.wait_async().await
    }

    /// Block until settled or until `ctx` is canceled, whichever comes first.
    ///
    /// A value that is available when the context fires still wins.
    pub fn wait_context(&self, ctx: &ExecContext) -> Option<T> {
        self.view.wait_context(ctx)
    }

    /// Async form of [`wait_context`](Self::wait_context).
    pub async fn wait_context_async(&self, ctx: &ExecContext) -> Option<T> {
        self.view.wait_context_async(ctx).await
    }
}

impl<T: Clone> Default for Future<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Future").field(&*self.tx.borrow()).finish()
    }
}
