//! DuckDuckGo HTML results page parser.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use replidocs_shared::SearchCandidate;

/// Base used to resolve the protocol-relative redirect links DuckDuckGo emits.
const DDG_BASE: &str = "https://duckduckgo.com/";

/// Extract up to `max_results` organic results, in page order.
///
/// Ads and results without a usable http(s) target are skipped.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<SearchCandidate> {
    let doc = Html::parse_document(html);
    let result_sel = Selector::parse("div.result").expect("valid selector");
    let title_sel = Selector::parse("a.result__a").expect("valid selector");
    let snippet_sel = Selector::parse(".result__snippet").expect("valid selector");

    let mut candidates = Vec::new();

    for block in doc.select(&result_sel) {
        if candidates.len() >= max_results {
            break;
        }
        if block.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(anchor) = block.select(&title_sel).next() else {
            continue;
        };
        let Some(link) = anchor.value().attr("href").and_then(resolve_link) else {
            continue;
        };

        let title = element_text(&anchor);
        let body = block
            .select(&snippet_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        candidates.push(SearchCandidate { title, link, body });
    }

    candidates
}

/// Turn a result href into the real target URL.
///
/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`;
/// direct links are passed through.
pub(crate) fn resolve_link(href: &str) -> Option<String> {
    let base = Url::parse(DDG_BASE).ok()?;
    let url = base.join(href).ok()?;

    if url.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) {
        if url.path() != "/l/" {
            return None;
        }
        let target = url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())?;
        return Url::parse(&target)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .map(|_| target);
    }

    match url.scheme() {
        "http" | "https" => Some(href.to_string()),
        _ => None,
    }
}

/// Collapse an element's text nodes into a single-spaced string.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> String {
        std::fs::read_to_string("../../../fixtures/html/duckduckgo.html")
            .expect("read duckduckgo fixture")
    }

    #[test]
    fn parses_organic_results_in_order() {
        let results = parse_results(&fixture(), 10);
        let links: Vec<&str> = results.iter().map(|c| c.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://docs.python.org/3/tutorial/inputoutput.html",
                "https://docs.python.org/3/library/functions.html#open",
                "https://realpython.com/read-write-files-python/",
                "https://www.w3schools.com/python/python_file_handling.asp",
            ]
        );
    }

    #[test]
    fn extracts_title_and_snippet_text() {
        let results = parse_results(&fixture(), 10);
        let first = &results[0];
        assert_eq!(first.title, "7. Input and Output \u{2014} Python 3.13 documentation");
        assert!(first.body.starts_with("open() returns a file object"));
    }

    #[test]
    fn respects_max_results() {
        let results = parse_results(&fixture(), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].link, "https://docs.python.org/3/library/functions.html#open");
    }

    #[test]
    fn skips_ads() {
        let results = parse_results(&fixture(), 10);
        assert!(!results.iter().any(|c| c.title.contains("Sponsored")));
    }

    #[test]
    fn empty_page_has_no_results() {
        assert!(parse_results("", 6).is_empty());
        assert!(parse_results("<html><body>No results.</body></html>", 6).is_empty());
    }

    #[test]
    fn resolve_redirect_link() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fdocs%3Fv%3D2&rut=abc";
        assert_eq!(resolve_link(href).as_deref(), Some("https://example.com/docs?v=2"));
    }

    #[test]
    fn resolve_direct_link() {
        assert_eq!(
            resolve_link("https://doc.rust-lang.org/std/fs/struct.File.html").as_deref(),
            Some("https://doc.rust-lang.org/std/fs/struct.File.html")
        );
    }

    #[test]
    fn resolve_rejects_non_http() {
        assert!(resolve_link("javascript:void(0)").is_none());
        assert!(resolve_link("mailto:someone@example.com").is_none());
        assert!(resolve_link("https://duckduckgo.com/y.js?ad_provider=x").is_none());
    }
}
