//! A count of outstanding dispatch tasks that can be awaited down to zero.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    notify: Notify,
}

/// Shared completion counter.
///
/// Each unit of work holds a [`BarrierGuard`] from [`register`](Self::register);
/// dropping the guard marks that unit done, whether the task returned or
/// panicked. [`wait`](Self::wait) resolves once nothing is outstanding.
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

/// Marks one outstanding unit of work until dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the work as done"]
pub struct BarrierGuard {
    inner: Arc<Inner>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of outstanding work.
    pub fn register(&self) -> BarrierGuard {
        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        BarrierGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Waits until every registered guard has been dropped.
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking so a release between the check
            // and the await is not missed.
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.notify.notify_waiters();
        }
    }
}
