//! Cooperative cancellation for the rotation loop.
//!
//! A [`CancelToken`] is cloned into the background task and polled at its
//! suspension points: before each fade step and while waiting between steps
//! or dwelling. Cancelling never interrupts a write in progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// How a cancellable wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

/// A cloneable, one-way cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag cancellation and wake any task parked in [`CancelToken::sleep`].
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Whether both handles observe the same flag.
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Wait for `duration`, returning early if cancelled.
    pub async fn sleep(&self, duration: Duration) -> Wake {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // register before checking the flag so a concurrent cancel is not lost
        notified.as_mut().enable();
        if self.is_cancelled() {
            return Wake::Cancelled;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                if self.is_cancelled() { Wake::Cancelled } else { Wake::Elapsed }
            }
            _ = notified => Wake::Cancelled,
        }
    }
}
