//! Site graph data model
//!
//! This module holds the crawl's result types and the concurrent map they
//! live in:
//!
//! - `Page`: one crawled document with its outbound/inbound edges and assets
//! - `Asset`: a static resource referenced by a page
//! - `SiteGraph`: the URL → Page map, shared between extraction workers

use std::collections::HashMap;
use std::sync::RwLock;

/// Reserved key for the synthetic entry point of the crawl.
///
/// The root URL is recorded as linked-to from this sentinel so the first
/// extraction has an originating page to attach its forward edge to. The
/// sentinel is removed before the graph is handed to the caller, so it is
/// never observable outside the crawl.
pub(crate) const SENTINEL: &str = "<root>";

/// Kind of static asset referenced by a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// A hyperlink reference to a file (from `<a href>` or `<link href>`)
    Link,
    /// A script source (`<script src>`)
    Script,
    /// An image source (`<img src>`)
    Image,
    /// A video/audio source (`<source src>`)
    Video,
}

/// A static resource referenced by a page
///
/// Assets are deduplicated within a single page's extraction pass only;
/// the same asset URL may appear on any number of distinct pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub kind: AssetKind,
    pub url: String,
}

/// A single crawled page's extracted metadata
///
/// Edges are stored as URL keys into the owning [`SiteGraph`] map rather
/// than shared pointers; the map owns every node exactly once. Append order
/// of both edge lists reflects discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub links_to: Vec<String>,
    pub linked_from: Vec<String>,
    pub assets: Vec<Asset>,
}

impl Page {
    /// Creates a page with empty edge lists
    pub fn new(url: String, title: String, assets: Vec<Asset>) -> Self {
        Self {
            url,
            title,
            links_to: Vec::new(),
            linked_from: Vec::new(),
            assets,
        }
    }
}

/// The URL → Page map, shared between concurrent extraction workers
///
/// Guarded by a single read/write lock of its own; the dispatched and retry
/// maps in the tracker have independent locks, and no crawl operation holds
/// more than one of the three at a time. All critical sections here are
/// short and never span an `.await`.
#[derive(Debug, Default)]
pub struct SiteGraph {
    pages: RwLock<HashMap<String, Page>>,
}

impl SiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the sentinel entry the root page will be linked from
    pub(crate) fn insert_sentinel(&self) {
        let mut pages = self.pages.write().unwrap();
        pages.insert(SENTINEL.to_string(), Page::default());
    }

    /// Deletes the sentinel entry; called once the crawl has drained
    pub(crate) fn remove_sentinel(&self) {
        let mut pages = self.pages.write().unwrap();
        pages.remove(SENTINEL);
    }

    /// Registers a freshly extracted page under its URL
    ///
    /// Dispatch gating upstream guarantees each URL is extracted at most
    /// once, so this is the page's first (and only) registration.
    pub fn register(&self, page: Page) {
        let mut pages = self.pages.write().unwrap();
        pages.insert(page.url.clone(), page);
    }

    /// Returns true once `url` has a registered page ("visited")
    pub fn contains(&self, url: &str) -> bool {
        let pages = self.pages.read().unwrap();
        pages.contains_key(url)
    }

    /// Appends `to` onto the outbound edge list of `from`
    ///
    /// Invoked when `to`'s extraction completes; `from` is the page that
    /// originally discovered it and is already registered.
    pub fn record_link_to(&self, from: &str, to: &str) {
        let mut pages = self.pages.write().unwrap();
        if let Some(page) = pages.get_mut(from) {
            page.links_to.push(to.to_string());
        }
    }

    /// Appends `source` onto the inbound edge list of `target`
    ///
    /// Invoked when an already-visited `target` is rediscovered from
    /// `source`. First discoveries record only the forward edge (via
    /// [`record_link_to`](Self::record_link_to)); the two lists are
    /// deliberately not kept symmetric.
    pub fn record_link_from(&self, target: &str, source: &str) {
        let mut pages = self.pages.write().unwrap();
        if let Some(page) = pages.get_mut(target) {
            page.linked_from.push(source.to_string());
        }
    }

    /// Number of registered pages, sentinel included while it exists
    pub fn len(&self) -> usize {
        let pages = self.pages.read().unwrap();
        pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a clone of the full map
    ///
    /// Intended for use after the completion signal has fired, when no
    /// writers remain.
    pub fn snapshot(&self) -> HashMap<String, Page> {
        let pages = self.pages.read().unwrap();
        pages.clone()
    }
}
