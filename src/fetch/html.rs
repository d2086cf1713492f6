// src/fetch/html.rs
// =============================================================================
// This module discovers links in fetched HTML pages.
//
// We use the `scraper` crate to find every <a href="..."> and the `url` crate
// to resolve each href against the page it was found on, the way a browser
// would. The result is a list of absolute http/https URLs, ready for the
// filter pipeline.
//
// Fragments (#section) are dropped: page#a and page#b are the same page.
// Nothing else about the URL is changed.
// =============================================================================

use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        // "a[href]" is a constant, valid selector
        Selector::parse("a[href]").expect("static selector must parse")
    })
}

// Extracts every crawlable link from an HTML page
//
// Parameters:
//   html: the page body
//   base: the URL of the page (for resolving relative links)
//
// Returns: absolute http/https URLs, in document order (duplicates kept)
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    document
        .select(anchor_selector())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect()
}

// Resolves an href to an absolute URL, or None if it is not worth crawling
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !is_crawlable(&url) {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    fn strings(links: Vec<Url>) -> Vec<String> {
        links.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        assert_eq!(strings(extract_links(html, &base())), vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_links() {
        let html = r#"
            <a href="/docs">Docs</a>
            <a href="child">Child</a>
            <a href="../about">About</a>
        "#;
        assert_eq!(
            strings(extract_links(html, &base())),
            vec![
                "https://example.com/docs",
                "https://example.com/page/child",
                "https://example.com/about",
            ]
        );
    }

    #[test]
    fn test_skip_special_links() {
        let html = r##"
            <a href="#section">Anchor</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:123">Call</a>
            <a href="javascript:void(0)">JS</a>
            <a href="ftp://example.com/file">FTP</a>
            <a>No href</a>
        "##;
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn test_fragment_is_dropped_query_kept() {
        let html = r#"<a href="/a?b=1#top">A</a>"#;
        assert_eq!(strings(extract_links(html, &base())), vec!["https://example.com/a?b=1"]);
    }
}
