//! HTML metadata extractor
//!
//! This module parses fetched page bodies into the pieces the crawler cares
//! about:
//! - the page title
//! - same-host links to follow (resolved to absolute URLs)
//! - static assets (scripts, images, stylesheets/files, video sources)
//!
//! File-like references are classified as assets via an extension heuristic
//! rather than followed as pages. Links and assets are each deduplicated
//! within a single extraction pass, preserving discovery order.

use crate::graph::{Asset, AssetKind};
use crate::{ConfigError, ParseError};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Everything extracted from a single page body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    /// Page title, empty when the document has none
    pub title: String,
    /// Unique same-host links in discovery order, absolute
    pub links: Vec<String>,
    /// Unique static assets in discovery order
    pub assets: Vec<Asset>,
}

/// Parses raw page bytes into a title, link list, and asset list
pub trait Extractor: Send + Sync {
    fn extract(&self, body: &[u8]) -> Result<Extracted, ParseError>;
}

/// Default [`Extractor`] bound to the crawl root's host
///
/// Only links on the same host as the root are returned; everything else is
/// either classified as an asset (file-like references) or dropped
/// (cross-domain links).
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    root: Url,
}

impl HtmlExtractor {
    /// Creates an extractor for the given root URL
    ///
    /// Fails fast when the root is not an absolute http(s) URL with a host;
    /// this is the configuration check that gates crawler construction.
    pub fn new(root_url: &str) -> Result<Self, ConfigError> {
        let root = Url::parse(root_url).map_err(|source| ConfigError::InvalidRootUrl {
            url: root_url.to_string(),
            source,
        })?;

        if root.scheme() != "http" && root.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(root_url.to_string()));
        }
        if root.host_str().is_none() {
            return Err(ConfigError::MissingHost(root_url.to_string()));
        }

        Ok(Self { root })
    }

    /// Resolves `href` against the crawl root, returning None for garbage
    fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.root.join(href).ok()
    }

    /// True when `href` stays on the crawl root's host
    ///
    /// Relative references count as same-host by construction.
    fn is_same_host(&self, resolved: &Url) -> bool {
        resolved.host_str() == self.root.host_str()
    }

    /// True when the path looks like a static file rather than a page
    ///
    /// A reference is file-like when its last path segment carries a dotted
    /// alphabetic extension, excluding `.html`/`.htm` which are pages.
    fn is_file_url(&self, resolved: &Url) -> bool {
        let path = resolved.path();
        if path.ends_with(".html") || path.ends_with(".htm") {
            return false;
        }

        let segment = path.rsplit('/').next().unwrap_or("");
        match segment.rsplit_once('.') {
            Some((name, ext)) => {
                !name.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic())
            }
            None => false,
        }
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, body: &[u8]) -> Result<Extracted, ParseError> {
        let html = std::str::from_utf8(body)?;
        let document = Html::parse_document(html);

        let title = title_selector()
            .and_then(|sel| {
                document
                    .select(&sel)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
            })
            .unwrap_or_default();

        let mut links = Vec::new();
        let mut assets = Vec::new();
        let mut seen_links: HashSet<String> = HashSet::new();
        let mut seen_assets: HashSet<String> = HashSet::new();

        let mut push_asset = |url: Url, kind: AssetKind, seen: &mut HashSet<String>| {
            let url = url.to_string();
            if seen.insert(url.clone()) {
                assets.push(Asset { kind, url });
            }
        };

        // Anchors either point at files (assets) or at pages to follow
        if let Ok(sel) = Selector::parse("a[href]") {
            for element in document.select(&sel) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                let Some(resolved) = self.resolve(href) else {
                    continue;
                };

                if self.is_file_url(&resolved) {
                    push_asset(resolved, AssetKind::Link, &mut seen_assets);
                } else if self.is_same_host(&resolved) {
                    let url = resolved.to_string();
                    if seen_links.insert(url.clone()) {
                        links.push(url);
                    }
                }
            }
        }

        for (selector, attr, kind) in [
            ("script[src]", "src", AssetKind::Script),
            ("img[src]", "src", AssetKind::Image),
            ("link[href]", "href", AssetKind::Link),
            ("source[src]", "src", AssetKind::Video),
        ] {
            if let Ok(sel) = Selector::parse(selector) {
                for element in document.select(&sel) {
                    let Some(value) = element.value().attr(attr) else {
                        continue;
                    };
                    if let Some(resolved) = self.resolve(value) {
                        if self.is_file_url(&resolved) {
                            push_asset(resolved, kind, &mut seen_assets);
                        }
                    }
                }
            }
        }

        Ok(Extracted {
            title,
            links,
            assets,
        })
    }
}

fn title_selector() -> Option<Selector> {
    Selector::parse("title").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> HtmlExtractor {
        HtmlExtractor::new("https://example.com/").unwrap()
    }

    fn extract(html: &str) -> Extracted {
        extractor().extract(html.as_bytes()).unwrap()
    }

    #[test]
    fn test_rejects_relative_root() {
        assert!(matches!(
            HtmlExtractor::new("/just/a/path"),
            Err(ConfigError::InvalidRootUrl { .. })
        ));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            HtmlExtractor::new("ftp://example.com/"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_extract_title() {
        let page = extract("<html><head><title>  Hello  </title></head><body></body></html>");
        assert_eq!(page.title, "Hello");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let page = extract("<html><body><p>no title</p></body></html>");
        assert_eq!(page.title, "");
    }

    #[test]
    fn test_same_host_links_are_followed() {
        let page = extract(
            r#"<html><body>
                <a href="https://example.com/about">About</a>
                <a href="/contact">Contact</a>
                <a href="team">Team</a>
            </body></html>"#,
        );
        assert_eq!(
            page.links,
            vec![
                "https://example.com/about",
                "https://example.com/contact",
                "https://example.com/team",
            ]
        );
    }

    #[test]
    fn test_cross_domain_links_are_dropped() {
        let page = extract(r#"<html><body><a href="https://other.com/page">X</a></body></html>"#);
        assert!(page.links.is_empty());
        assert!(page.assets.is_empty());
    }

    #[test]
    fn test_links_deduplicated_within_page() {
        let page = extract(
            r#"<html><body>
                <a href="/a">one</a>
                <a href="/a">again</a>
                <a href="/b">two</a>
            </body></html>"#,
        );
        assert_eq!(
            page.links,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_file_like_anchor_becomes_asset() {
        let page = extract(r#"<html><body><a href="/report.pdf">report</a></body></html>"#);
        assert!(page.links.is_empty());
        assert_eq!(
            page.assets,
            vec![Asset {
                kind: AssetKind::Link,
                url: "https://example.com/report.pdf".to_string(),
            }]
        );
    }

    #[test]
    fn test_html_extension_is_a_page_not_an_asset() {
        let page = extract(r#"<html><body><a href="/about.html">about</a></body></html>"#);
        assert_eq!(page.links, vec!["https://example.com/about.html"]);
        assert!(page.assets.is_empty());
    }

    #[test]
    fn test_asset_classification_by_tag() {
        let page = extract(
            r#"<html><head>
                <link href="/style.css" rel="stylesheet">
                <script src="/app.js"></script>
            </head><body>
                <img src="/logo.png">
                <video><source src="/intro.mp4"></video>
            </body></html>"#,
        );

        let kinds: Vec<AssetKind> = page.assets.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AssetKind::Script,
                AssetKind::Image,
                AssetKind::Link,
                AssetKind::Video,
            ]
        );
        assert!(page
            .assets
            .iter()
            .any(|a| a.url == "https://example.com/style.css"));
    }

    #[test]
    fn test_assets_deduplicated_within_page() {
        let page = extract(
            r#"<html><body>
                <img src="/logo.png">
                <img src="/logo.png">
            </body></html>"#,
        );
        assert_eq!(page.assets.len(), 1);
    }

    #[test]
    fn test_extensionless_script_is_not_an_asset() {
        let page = extract(r#"<html><body><script src="/dynamic/loader"></script></body></html>"#);
        assert!(page.assets.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let err = extractor().extract(&[0x80, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
    }
}
