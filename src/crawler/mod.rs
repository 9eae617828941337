//! Crawl orchestration core
//!
//! This module coordinates the whole crawl:
//! - one fetch task per dispatched URL, with immediate retry (`dispatcher`)
//! - a bounded pool of extraction workers draining fetch results (`worker`)
//! - per-URL dispatch/retry state (`tracker`)
//! - outstanding-work accounting and termination (`pending`, `orchestrator`)

mod dispatcher;
mod orchestrator;
mod pending;
mod tracker;
mod worker;

pub use orchestrator::{Crawler, CrawlerOptions, DiscoveryCallback};

use crate::graph::Page;
use crate::Result;
use std::collections::HashMap;

/// Runs a crawl to completion and returns the finished site graph
///
/// Convenience wrapper over [`Crawler`]: errors from the crawl's error
/// stream are logged rather than surfaced, matching their best-effort
/// semantics. Use [`Crawler::start`] directly to consume them.
///
/// # Arguments
///
/// * `root_url` - Absolute http(s) address the crawl starts from
/// * `options` - Worker count, retry budget, and collaborator overrides
pub async fn crawl(root_url: &str, options: CrawlerOptions) -> Result<HashMap<String, Page>> {
    let mut crawler = Crawler::with_options(root_url, options)?;
    let (done, mut errors) = crawler.start();

    tokio::spawn(async move {
        while let Some(err) = errors.recv().await {
            tracing::warn!("crawl error: {err}");
        }
    });

    let _ = done.await;
    Ok(crawler.site_map())
}
