//! Fetch task with retry
//!
//! One task per dispatched URL, spawned at discovery time; fetch concurrency
//! is unbounded and scales with link fan-out, while the bounded results
//! channel applies backpressure only at the extraction stage.

use crate::crawler::orchestrator::CrawlState;
use bytes::Bytes;
use std::sync::Arc;

/// A successfully downloaded page, queued for extraction
#[derive(Debug)]
pub(crate) struct FetchedPage {
    /// The fetched URL
    pub(crate) url: String,
    /// URL of the page that discovered it (or the sentinel for the root)
    pub(crate) from: String,
    /// Raw body, owned
    pub(crate) body: Bytes,
}

/// Downloads `url`, retrying immediately on failure until the retry budget
/// is exhausted
///
/// On success the dispatched flag is cleared and the result is queued; the
/// pending-work unit is resolved later, by the extraction worker. On
/// permanent failure the unit is resolved here and the URL is retired:
/// its retry counter stays maxed out, so rediscovery never re-dispatches it.
pub(crate) async fn fetch(state: Arc<CrawlState>, url: String, from: String) {
    loop {
        match state.downloader.download(&url).await {
            Ok(body) => {
                state.tracker.mark_dispatched(&url, false);
                tracing::debug!(url = %url, "fetched page");

                let fetched = FetchedPage { url, from, body };
                if state.results_tx.send(fetched).await.is_err() {
                    // The queue closes only after the crawl drains; a result
                    // arriving after that still resolves its unit of work.
                    state.pending.done();
                }
                return;
            }
            Err(err) => {
                let retries = state.tracker.retry_count(&url);
                tracing::debug!(url = %url, retries, "fetch failed: {err}");
                state.report_error(err.into());

                if retries < state.max_retries {
                    state.tracker.record_retry(&url);
                    continue;
                }

                state.tracker.mark_dispatched(&url, false);
                state.pending.done();
                return;
            }
        }
    }
}
