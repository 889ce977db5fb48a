//! Promise — the read-only side of a [`Future`](crate::Future).

use crate::Slot;
use conflux_core::ExecContext;
use std::fmt;
use tokio::sync::watch;

/// Read-only view of a [`Future`](crate::Future).
///
/// Cheap to clone. Holds no ownership of the future: once the future is
/// dropped, a promise that never saw a value reports `None` from every wait.
pub struct Promise<T> {
    rx: watch::Receiver<Slot<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T: Clone> Promise<T> {
    pub(crate) fn from_receiver(rx: watch::Receiver<Slot<T>>) -> Self {
        Self { rx }
    }

    /// True once the future has a value.
    pub fn is_set(&self) -> bool {
        matches!(*self.rx.borrow(), Slot::Set(_))
    }

    /// True once the future was canceled before any value was set.
    pub fn is_canceled(&self) -> bool {
        matches!(*self.rx.borrow(), Slot::Canceled)
    }

    /// The value, if set. Never blocks.
    pub fn get(&self) -> Option<T> {
        self.rx.borrow().value()
    }

    /// Block the calling thread until the future is settled.
    ///
    /// Do not call from inside an async task; use [`wait_async`](Self::wait_async).
    pub fn wait(&self) -> Option<T> {
        futures::executor::block_on(self.wait_async())
    }

    /// Wait until the future is settled without blocking the thread.
    pub async fn wait_async(&self) -> Option<T> {
        let mut rx = self.rx.clone();
        let settled = rx.wait_for(Slot::is_settled).await;
        // Err means the future was dropped while still pending.
        settled.ok().and_then(|slot| slot.value())
    }

    /// Block until the future is settled or `ctx` is canceled.
    ///
    /// Do not call from inside an async task; use
    /// [`wait_context_async`](Self::wait_context_async).
    pub fn wait_context(&self, ctx: &ExecContext) -> Option<T> {
        futures::executor::block_on(self.wait_context_async(ctx))
    }

    /// Race settlement against `ctx`.
    ///
    /// Returns at once if the future is already settled, even when `ctx` is
    /// already canceled. If both become ready together the value wins, and
    /// after `ctx` fires the slot is checked once more before giving up.
    pub async fn wait_context_async(&self, ctx: &ExecContext) -> Option<T> {
        if self.rx.borrow().is_settled() {
            return self.get();
        }
        tokio::select! {
            biased;
            value = self.wait_async() => value,
            _ = ctx.cancelled() => self.get(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Promise").field(&*self.rx.borrow()).finish()
    }
}
