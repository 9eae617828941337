//! Sitegraph: a concurrent site-graph crawler
//!
//! This crate crawls a website starting from a root address, following links
//! within the same host, and assembles a graph of pages: which pages link to
//! which, and which static assets each page depends on.
//!
//! Fetching and parsing are pluggable collaborators ([`Downloader`] and
//! [`Extractor`]); the core of the crate is the orchestration in [`crawler`],
//! which bounds extraction concurrency, deduplicates work, retries failed
//! downloads, and detects when the crawl has fully drained.

pub mod crawler;
pub mod downloader;
pub mod extractor;
pub mod graph;
pub mod output;

use thiserror::Error;

/// Main error type for crawl operations
///
/// `Fetch` and `Parse` errors are reported on the crawl's error stream and
/// never abort the crawl; `Config` errors are returned synchronously from
/// crawler construction, before any task is spawned.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors detected while validating the crawl configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid root URL {url}: {source}")]
    InvalidRootUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("root URL must be absolute http or https: {0}")]
    UnsupportedScheme(String),

    #[error("root URL has no host: {0}")]
    MissingHost(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors produced while downloading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} for {url}")]
    BadStatus { url: String, status: u16 },
}

/// Errors produced while extracting metadata from a fetched body
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("page body is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use crawler::{Crawler, CrawlerOptions, DiscoveryCallback};
pub use downloader::{BufferPool, Downloader, HttpDownloader};
pub use extractor::{Extracted, Extractor, HtmlExtractor};
pub use graph::{Asset, AssetKind, Page};
