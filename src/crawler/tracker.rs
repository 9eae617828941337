//! Per-URL dispatch and retry bookkeeping
//!
//! Two maps, each behind its own read/write lock (the third piece of
//! per-URL state, visited membership, lives on the site graph's map). Lock
//! granularity is deliberately per-map: readers of different concerns never
//! contend, and no operation takes more than one lock.

use std::collections::HashMap;
use std::sync::RwLock;

/// Tracks which URLs have an in-flight fetch and how often each has retried
#[derive(Debug, Default)]
pub(crate) struct UrlTracker {
    dispatched: RwLock<HashMap<String, bool>>,
    retries: RwLock<HashMap<String, u32>>,
}

impl UrlTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True while `url` has a fetch task created but not yet resolved
    pub(crate) fn is_dispatched(&self, url: &str) -> bool {
        let dispatched = self.dispatched.read().unwrap();
        dispatched.get(url).copied().unwrap_or(false)
    }

    pub(crate) fn mark_dispatched(&self, url: &str, value: bool) {
        let mut dispatched = self.dispatched.write().unwrap();
        dispatched.insert(url.to_string(), value);
    }

    /// Times `url` has been retried so far; starts at zero, never reset
    pub(crate) fn retry_count(&self, url: &str) -> u32 {
        let retries = self.retries.read().unwrap();
        retries.get(url).copied().unwrap_or(0)
    }

    pub(crate) fn record_retry(&self, url: &str) {
        let mut retries = self.retries.write().unwrap();
        *retries.entry(url.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatched_defaults_to_false() {
        let tracker = UrlTracker::new();
        assert!(!tracker.is_dispatched("https://example.com/"));
    }

    #[test]
    fn test_mark_and_clear_dispatched() {
        let tracker = UrlTracker::new();
        tracker.mark_dispatched("a", true);
        assert!(tracker.is_dispatched("a"));
        assert!(!tracker.is_dispatched("b"));

        tracker.mark_dispatched("a", false);
        assert!(!tracker.is_dispatched("a"));
    }

    #[test]
    fn test_retry_counter_accumulates_per_url() {
        let tracker = UrlTracker::new();
        assert_eq!(tracker.retry_count("a"), 0);

        tracker.record_retry("a");
        tracker.record_retry("a");
        tracker.record_retry("b");

        assert_eq!(tracker.retry_count("a"), 2);
        assert_eq!(tracker.retry_count("b"), 1);
    }
}
