//! Outstanding-work counter driving crawl termination
//!
//! Counts URLs that have been dispatched but not yet resolved (extracted,
//! or permanently failed). The coordinator parks on [`PendingWork::wait`]
//! instead of polling; the final decrement wakes it.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// An awaitable counter of dispatched-but-unresolved URLs
#[derive(Debug, Default)]
pub(crate) struct PendingWork {
    count: AtomicUsize,
    drained: Notify,
}

impl PendingWork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `n` new units of outstanding work
    ///
    /// Must happen before the matching fetch task is spawned, so the count
    /// can never be observed at zero while work is still being created.
    pub(crate) fn add(&self, n: usize) {
        self.count.fetch_add(n, Ordering::SeqCst);
    }

    /// Resolves one unit of work, waking waiters on the last one
    pub(crate) fn done(&self) {
        let previous = self.count.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "pending work counter underflow");
        if previous == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Waits until the counter reaches zero
    ///
    /// The notification is armed before re-reading the count, so a `done`
    /// racing with this call cannot be missed.
    pub(crate) async fn wait(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
