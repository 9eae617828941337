//! Extraction worker pool
//!
//! A fixed number of long-lived workers drain the fetch-result queue,
//! invoke the extractor, grow the site graph, and dispatch newly discovered
//! URLs. Each worker listens on its own quit channel; the coordinator sends
//! exactly one stop signal per worker once the crawl has drained.

use crate::crawler::dispatcher::{self, FetchedPage};
use crate::crawler::orchestrator::CrawlState;
use crate::graph::Page;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Worker loop: wait for either a queued fetch result or the stop signal
pub(crate) async fn run(
    worker_id: usize,
    state: Arc<CrawlState>,
    queue: Arc<Mutex<mpsc::Receiver<FetchedPage>>>,
    mut quit: mpsc::Receiver<()>,
) {
    tracing::debug!(worker_id, "extraction worker started");

    loop {
        tokio::select! {
            fetched = async { queue.lock().await.recv().await } => {
                match fetched {
                    Some(fetched) => process(&state, fetched),
                    None => break,
                }
            }
            _ = quit.recv() => break,
        }
    }

    tracing::debug!(worker_id, "extraction worker stopped");
}

/// Extracts one fetched page and folds it into the graph
///
/// Regardless of extraction outcome the result counts as resolved: parse
/// failures are reported and the URL is retired without retry.
fn process(state: &Arc<CrawlState>, fetched: FetchedPage) {
    match state.extractor.extract(&fetched.body) {
        Ok(extracted) => {
            tracing::debug!(
                url = %fetched.url,
                links = extracted.links.len(),
                assets = extracted.assets.len(),
                "extracted page"
            );

            let page = Page::new(fetched.url.clone(), extracted.title, extracted.assets);
            state.graph.register(page);
            state.graph.record_link_to(&fetched.from, &fetched.url);

            for link in extracted.links {
                if state.graph.contains(&link) {
                    // Rediscovery of a visited page records only the
                    // back-edge on the target.
                    state.graph.record_link_from(&link, &fetched.url);
                } else if !state.tracker.is_dispatched(&link)
                    && state.tracker.retry_count(&link) < state.max_retries
                {
                    state.tracker.mark_dispatched(&link, true);
                    state.pending.add(1);
                    tokio::spawn(dispatcher::fetch(
                        state.clone(),
                        link.clone(),
                        fetched.url.clone(),
                    ));

                    if let Some(callback) = state.on_discover.clone() {
                        tokio::spawn(async move { callback(link) });
                    }
                }
            }
        }
        Err(err) => {
            tracing::warn!(url = %fetched.url, "extraction failed: {err}");
            state.report_error(err.into());
        }
    }

    state.pending.done();
}
