//! Human-readable site-map rendering
//!
//! Renders the finished graph as a boxed per-page report: the page's URL
//! and title, followed by its assets, outbound links, and inbound links.
//! Pages are sorted by URL so repeated runs over the same site produce the
//! same report.

use crate::graph::Page;
use std::collections::HashMap;
use std::fmt::Write;

const RULE: &str = "─────────────────────────────────────────────────";

/// Renders the site map to a string
pub fn render_site_map(site_map: &HashMap<String, Page>) -> String {
    let mut urls: Vec<&String> = site_map.keys().collect();
    urls.sort();

    let mut out = String::new();
    for url in urls {
        let page = &site_map[url];

        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Crawled {} | {}", url, page.title);

        if !page.assets.is_empty() {
            let _ = writeln!(out, " ╠ Assets:");
            for asset in &page.assets {
                let _ = writeln!(out, " ╠══ {}", asset.url);
            }
        }
        if !page.links_to.is_empty() {
            let _ = writeln!(out, " ╠ Links to:");
            for link in &page.links_to {
                let _ = writeln!(out, " ╠══ {link}");
            }
        }
        if !page.linked_from.is_empty() {
            let _ = writeln!(out, " ╠ Linked from:");
            for link in &page.linked_from {
                let _ = writeln!(out, " ╠══ {link}");
            }
        }
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out);
    }

    out
}

/// Prints the rendered site map to stdout
pub fn print_site_map(site_map: &HashMap<String, Page>) {
    print!("{}", render_site_map(site_map));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Asset, AssetKind};

    fn site_map() -> HashMap<String, Page> {
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/".to_string(),
            Page {
                url: "https://example.com/".to_string(),
                title: "Home".to_string(),
                links_to: vec!["https://example.com/about".to_string()],
                linked_from: vec![],
                assets: vec![Asset {
                    kind: AssetKind::Image,
                    url: "https://example.com/logo.png".to_string(),
                }],
            },
        );
        pages.insert(
            "https://example.com/about".to_string(),
            Page::new("https://example.com/about".to_string(), "About".to_string(), vec![]),
        );
        pages
    }

    #[test]
    fn test_render_includes_title_and_sections() {
        let rendered = render_site_map(&site_map());
        assert!(rendered.contains("Crawled https://example.com/ | Home"));
        assert!(rendered.contains(" ╠ Assets:"));
        assert!(rendered.contains(" ╠══ https://example.com/logo.png"));
        assert!(rendered.contains(" ╠ Links to:"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let rendered = render_site_map(&site_map());
        // The about page has no edges or assets, so only its header appears
        let about = rendered
            .split("Crawled https://example.com/about | About")
            .nth(1)
            .unwrap();
        let body_lines: Vec<&str> = about
            .lines()
            .take_while(|line| !line.starts_with(RULE))
            .collect();
        assert!(body_lines.iter().all(|line| !line.starts_with(" ╠")));
    }

    #[test]
    fn test_pages_sorted_by_url() {
        let rendered = render_site_map(&site_map());
        let root = rendered.find("Crawled https://example.com/ |").unwrap();
        let about = rendered.find("Crawled https://example.com/about").unwrap();
        assert!(root < about);
    }

    #[test]
    fn test_empty_site_map_renders_nothing() {
        assert_eq!(render_site_map(&HashMap::new()), "");
    }
}
