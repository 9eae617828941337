//! Crawl orchestration
//!
//! The [`Crawler`] owns one crawl's shared state: the site graph, the
//! per-URL tracker, the pending-work counter, and the channels between the
//! fetch tasks and the extraction pool. Independent crawls share nothing.
//!
//! Termination is coordinated by a driver task: it seeds the root fetch,
//! parks on the pending-work counter, and once the counter drains it stops
//! each worker, closes the result queue, strips the sentinel entry, and
//! fires the completion signal exactly once.

use crate::crawler::pending::PendingWork;
use crate::crawler::tracker::UrlTracker;
use crate::crawler::{dispatcher, worker};
use crate::downloader::{Downloader, HttpDownloader};
use crate::extractor::{Extractor, HtmlExtractor};
use crate::graph::{Page, SiteGraph, SENTINEL};
use crate::{ConfigError, CrawlError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

/// Capacity of the best-effort error stream; reports beyond it are dropped
/// rather than stalling the crawl.
const ERROR_STREAM_CAPACITY: usize = 100;

/// Callback invoked (fire-and-forget) for each newly dispatched URL
pub type DiscoveryCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Optional crawl parameters
///
/// `max_workers` bounds the extraction pool only; download concurrency is
/// unbounded. `max_retries` is the per-URL retry budget on top of the first
/// attempt.
#[derive(Clone, Default)]
pub struct CrawlerOptions {
    pub max_workers: Option<usize>,
    pub max_retries: Option<u32>,
    pub downloader: Option<Arc<dyn Downloader>>,
    pub extractor: Option<Arc<dyn Extractor>>,
    pub on_discover: Option<DiscoveryCallback>,
}

impl CrawlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_on_discover(mut self, callback: DiscoveryCallback) -> Self {
        self.on_discover = Some(callback);
        self
    }
}

const DEFAULT_MAX_WORKERS: usize = 10;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Shared state of one running crawl
pub(crate) struct CrawlState {
    pub(crate) max_retries: u32,
    pub(crate) downloader: Arc<dyn Downloader>,
    pub(crate) extractor: Arc<dyn Extractor>,
    pub(crate) on_discover: Option<DiscoveryCallback>,
    pub(crate) graph: SiteGraph,
    pub(crate) tracker: UrlTracker,
    pub(crate) pending: PendingWork,
    pub(crate) results_tx: mpsc::Sender<dispatcher::FetchedPage>,
    errors_tx: mpsc::Sender<CrawlError>,
}

impl CrawlState {
    /// Best-effort error report; dropped silently when the stream is full
    /// or the receiver is gone
    pub(crate) fn report_error(&self, err: CrawlError) {
        let _ = self.errors_tx.try_send(err);
    }
}

/// A site crawler bound to a single root URL
///
/// ```no_run
/// use sitegraph::{Crawler, CrawlerOptions};
///
/// # async fn example() -> sitegraph::Result<()> {
/// let mut crawler = Crawler::with_options(
///     "https://example.com/",
///     CrawlerOptions::new().with_max_workers(4),
/// )?;
/// let (done, _errors) = crawler.start();
/// let _ = done.await;
/// let site_map = crawler.site_map();
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    root_url: String,
    max_workers: usize,
    max_retries: u32,
    downloader: Arc<dyn Downloader>,
    extractor: Arc<dyn Extractor>,
    on_discover: Option<DiscoveryCallback>,
    state: Option<Arc<CrawlState>>,
}

impl Crawler {
    /// Creates a crawler with default options
    ///
    /// Fails with a [`ConfigError`] when the root URL is not an absolute
    /// http(s) URL; no task is spawned before validation passes.
    pub fn new(root_url: &str) -> Result<Self> {
        Self::with_options(root_url, CrawlerOptions::default())
    }

    /// Creates a crawler with the given options
    pub fn with_options(root_url: &str, options: CrawlerOptions) -> Result<Self> {
        // The root URL is validated even when the built-in extractor is
        // overridden.
        let default_extractor = HtmlExtractor::new(root_url)?;
        let extractor: Arc<dyn Extractor> = match options.extractor {
            Some(extractor) => extractor,
            None => Arc::new(default_extractor),
        };

        let downloader: Arc<dyn Downloader> = match options.downloader {
            Some(downloader) => downloader,
            None => Arc::new(
                HttpDownloader::new(2, Default::default()).map_err(ConfigError::HttpClient)?,
            ),
        };

        Ok(Self {
            root_url: root_url.to_string(),
            max_workers: options.max_workers.unwrap_or(DEFAULT_MAX_WORKERS).max(1),
            max_retries: options.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            downloader,
            extractor,
            on_discover: options.on_discover,
            state: None,
        })
    }

    /// Starts the crawl and returns its two result signals
    ///
    /// The completion receiver resolves exactly once, after the last
    /// outstanding URL is resolved and the worker pool has shut down. The
    /// error receiver carries fetch and parse failures; it is lossy under
    /// backpressure and carries nothing fatal, since per-URL failures never
    /// abort the crawl.
    pub fn start(&mut self) -> (oneshot::Receiver<()>, mpsc::Receiver<CrawlError>) {
        let (results_tx, results_rx) = mpsc::channel(self.max_workers);
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_STREAM_CAPACITY);
        let (done_tx, done_rx) = oneshot::channel();

        let state = Arc::new(CrawlState {
            max_retries: self.max_retries,
            downloader: self.downloader.clone(),
            extractor: self.extractor.clone(),
            on_discover: self.on_discover.clone(),
            graph: SiteGraph::new(),
            tracker: UrlTracker::new(),
            pending: PendingWork::new(),
            results_tx,
            errors_tx,
        });
        self.state = Some(state.clone());

        let queue = Arc::new(Mutex::new(results_rx));
        let mut quit_senders = Vec::with_capacity(self.max_workers);
        let mut worker_handles = Vec::with_capacity(self.max_workers);
        for worker_id in 0..self.max_workers {
            let (quit_tx, quit_rx) = mpsc::channel(1);
            quit_senders.push(quit_tx);
            worker_handles.push(tokio::spawn(worker::run(
                worker_id,
                state.clone(),
                queue.clone(),
                quit_rx,
            )));
        }

        let root_url = self.root_url.clone();
        tokio::spawn(async move {
            tracing::info!(root = %root_url, "starting crawl");

            state.graph.insert_sentinel();
            state.pending.add(1);
            tokio::spawn(dispatcher::fetch(
                state.clone(),
                root_url,
                SENTINEL.to_string(),
            ));

            state.pending.wait().await;

            // One stop signal per worker; each worker acknowledges by
            // finishing its task.
            for quit in &quit_senders {
                let _ = quit.send(()).await;
            }
            for handle in worker_handles {
                let _ = handle.await;
            }

            queue.lock().await.close();
            state.graph.remove_sentinel();

            tracing::info!(pages = state.graph.len(), "crawl complete");
            let _ = done_tx.send(());
        });

        (done_rx, errors_rx)
    }

    /// Returns a copy of the crawled site graph
    ///
    /// Stable only after the completion signal has fired; before the crawl
    /// starts this is empty.
    pub fn site_map(&self) -> HashMap<String, Page> {
        self.state
            .as_ref()
            .map(|state| state.graph.snapshot())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned bodies from a map; anything else is a 404
    struct ScriptedDownloader {
        pages: HashMap<String, &'static str>,
        requests: AtomicUsize,
    }

    impl ScriptedDownloader {
        fn new(pages: Vec<(&str, &'static str)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, body)| (url.to_string(), body))
                    .collect(),
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Downloader for ScriptedDownloader {
        async fn download(&self, url: &str) -> std::result::Result<Bytes, FetchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(url) {
                Some(body) => Ok(Bytes::from_static(body.as_bytes())),
                None => Err(FetchError::BadStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    #[test]
    fn test_invalid_root_url_fails_construction() {
        assert!(Crawler::new("not a url").is_err());
        assert!(Crawler::new("ftp://example.com/").is_err());
    }

    #[test]
    fn test_options_defaults() {
        let options = CrawlerOptions::new();
        assert!(options.max_workers.is_none());
        assert!(options.max_retries.is_none());

        let crawler = Crawler::new("https://example.com/").unwrap();
        assert_eq!(crawler.max_workers, 10);
        assert_eq!(crawler.max_retries, 2);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let crawler = Crawler::with_options(
            "https://example.com/",
            CrawlerOptions::new().with_max_workers(0),
        )
        .unwrap();
        assert_eq!(crawler.max_workers, 1);
    }

    #[tokio::test]
    async fn test_crawls_scripted_site_to_completion() {
        let downloader = Arc::new(ScriptedDownloader::new(vec![
            (
                "http://site.test/",
                r#"<html><head><title>Root</title></head>
                   <body><a href="http://site.test/a">a</a></body></html>"#,
            ),
            (
                "http://site.test/a",
                "<html><head><title>A</title></head><body></body></html>",
            ),
        ]));

        let mut crawler = Crawler::with_options(
            "http://site.test/",
            CrawlerOptions::new()
                .with_downloader(downloader.clone())
                .with_max_workers(2),
        )
        .unwrap();

        let (done, _errors) = crawler.start();
        done.await.expect("completion signal");

        let site_map = crawler.site_map();
        assert_eq!(site_map.len(), 2);
        assert_eq!(site_map["http://site.test/"].title, "Root");
        assert_eq!(
            site_map["http://site.test/"].links_to,
            vec!["http://site.test/a"]
        );
        assert_eq!(downloader.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_independent_crawls_share_no_state() {
        let downloader = Arc::new(ScriptedDownloader::new(vec![(
            "http://site.test/",
            "<html><head><title>Only</title></head><body></body></html>",
        )]));

        for _ in 0..2 {
            let mut crawler = Crawler::with_options(
                "http://site.test/",
                CrawlerOptions::new().with_downloader(downloader.clone()),
            )
            .unwrap();
            let (done, _errors) = crawler.start();
            done.await.expect("completion signal");
            assert_eq!(crawler.site_map().len(), 1);
        }

        // The second crawl refetched the root: no visited state leaked over.
        assert_eq!(downloader.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_root_still_terminates() {
        let downloader = Arc::new(ScriptedDownloader::new(vec![]));

        let mut crawler = Crawler::with_options(
            "http://site.test/",
            CrawlerOptions::new()
                .with_downloader(downloader.clone())
                .with_max_retries(1),
        )
        .unwrap();

        let (done, mut errors) = crawler.start();
        done.await.expect("completion signal");

        assert!(crawler.site_map().is_empty());
        // First attempt plus one retry, each reported
        assert_eq!(downloader.requests.load(Ordering::SeqCst), 2);
        assert!(matches!(errors.recv().await, Some(CrawlError::Fetch(_))));
    }
}
