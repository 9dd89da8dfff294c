pub mod classify;
pub mod next_control;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

pub use classify::{PaginationMode, classify};
pub use next_control::{NextControl, at_explicit_end, locate_next_control};

/// One loaded page parsed for pagination inspection.
///
/// Owns the parsed document and the page's own URL so the classifier, the
/// next-control search and link discovery all read the same snapshot.
pub struct PageProbe {
    doc: Html,
    base: Url,
}

impl PageProbe {
    /// Parse a page snapshot for inspection
    pub fn new(html: &str, base: Url) -> Self {
        Self {
            doc: Html::parse_document(html),
            base,
        }
    }

    /// URL the snapshot was loaded from
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The parsed document
    pub fn document(&self) -> &Html {
        &self.doc
    }

    /// Markup regions presumed to hold page-navigation controls.
    ///
    /// Matches `div`/`nav`/`ul`/`ol` elements flagged by class, id or role
    /// hints: `pagination`/`pager` classes or ids, `page` combined with
    /// `number`/`item` classes, or a `navigation` role.
    pub fn paging_containers(&self) -> Vec<ElementRef<'_>> {
        let container_selector = Selector::parse("div, nav, ul, ol").unwrap();
        self.doc
            .select(&container_selector)
            .filter(|el| is_paging_container(el))
            .collect()
    }

    /// Whether the page carries a FacetWP-style widget
    pub fn has_vendor_widget(&self) -> bool {
        let vendor_selector = Selector::parse(r#"[class*="facetwp"]"#).unwrap();
        self.doc.select(&vendor_selector).next().is_some()
    }

    /// "current X of Y" indicator, looked for inside paging containers only.
    ///
    /// Prefers the text of an `aria-current="page"` element, then the
    /// container's whole text.
    pub fn page_indicator(&self) -> Option<(u32, u32)> {
        let indicator_re = Regex::new(r"(?i)(\d+)\s*of\s*(\d+)").unwrap();
        let current_selector = Selector::parse(r#"a[aria-current="page"]"#).unwrap();

        for container in self.paging_containers() {
            if let Some(marked) = container.select(&current_selector).next() {
                if let Some(pair) = parse_indicator(&indicator_re, &element_text(&marked)) {
                    return Some(pair);
                }
            }
            if let Some(pair) = parse_indicator(&indicator_re, &element_text(&container)) {
                return Some(pair);
            }
        }
        None
    }

    /// Current page number inferred from an active/current marker inside a
    /// paging container
    pub fn current_page_marker(&self) -> Option<u32> {
        let anchor_selector = Selector::parse("a").unwrap();
        for container in self.paging_containers() {
            for anchor in container.select(&anchor_selector) {
                let is_current = anchor.value().attr("aria-current").is_some()
                    || attr_lower(&anchor, "class").contains("active");
                if !is_current {
                    continue;
                }
                let text = element_text(&anchor);
                if let Some(n) = parse_page_number(&text) {
                    return Some(n);
                }
            }
        }
        None
    }

    /// Active page index from a FacetWP widget (`data-page` of the active
    /// page link)
    pub fn vendor_active_page(&self) -> Option<u32> {
        self.vendor_page_with_class("active")
    }

    /// Last page index from a FacetWP widget
    pub fn vendor_last_page(&self) -> Option<u32> {
        self.vendor_page_with_class("last")
    }

    fn vendor_page_with_class(&self, marker: &str) -> Option<u32> {
        let anchor_selector = Selector::parse("a[data-page]").unwrap();
        for anchor in self.doc.select(&anchor_selector) {
            let class = attr_lower(&anchor, "class");
            if class.contains("facetwp-page") && class.contains(marker) {
                if let Some(n) = anchor
                    .value()
                    .attr("data-page")
                    .and_then(|v| v.trim().parse().ok())
                {
                    return Some(n);
                }
            }
        }
        None
    }

    /// Pagination-shaped links on this page, deduplicated, in discovery
    /// order.
    ///
    /// A link qualifies when it is same-host and pagination-shaped (page
    /// query parameter or `/page-N` path segment), found either inside a
    /// paging container or anywhere sharing the current path.
    pub fn pagination_link_candidates(&self) -> Vec<Url> {
        let anchor_selector = Selector::parse("a[href]").unwrap();
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        let mut push = |url: Url, out: &mut Vec<Url>| {
            if seen.insert(url.to_string()) {
                out.push(url);
            }
        };

        // Links inside recognized paging containers
        for container in self.paging_containers() {
            for anchor in container.select(&anchor_selector) {
                let Some(resolved) = self.resolve_same_host(&anchor) else {
                    continue;
                };
                if is_pagination_shaped(&resolved) {
                    push(resolved, &mut candidates);
                }
            }
        }

        // Shaped links anywhere on the page that share the current path
        let base_path = self.base.path();
        for anchor in self.doc.select(&anchor_selector) {
            let Some(resolved) = self.resolve_same_host(&anchor) else {
                continue;
            };
            let path = resolved.path().to_string();
            if has_page_query(&resolved) {
                if path == base_path || path.starts_with(base_path) || base_path.starts_with(&path)
                {
                    push(resolved, &mut candidates);
                }
            } else if has_page_path_segment(&resolved)
                && (path.contains(base_path) || base_path.contains(&path))
            {
                push(resolved, &mut candidates);
            }
        }

        candidates
    }

    fn resolve_same_host(&self, anchor: &ElementRef<'_>) -> Option<Url> {
        let href = anchor.value().attr("href")?.trim();
        if is_noop_href(href) {
            return None;
        }
        let resolved = self.base.join(href).ok()?;
        if resolved.host_str() != self.base.host_str() {
            return None;
        }
        Some(resolved)
    }
}

/// Whether an element is a recognized paging container
fn is_paging_container(el: &ElementRef<'_>) -> bool {
    let class = attr_lower(el, "class");
    let id = attr_lower(el, "id");
    let role = attr_lower(el, "role");

    class.contains("pagination")
        || class.contains("pager")
        || (class.contains("page") && (class.contains("number") || class.contains("item")))
        || id.contains("pagination")
        || id.contains("pager")
        || role.contains("navigation")
}

/// Whether a URL differs from a plain listing page only by a page-number
/// query parameter or a `/page-N`-style path segment
pub fn is_pagination_shaped(url: &Url) -> bool {
    has_page_query(url) || has_page_path_segment(url)
}

fn has_page_query(url: &Url) -> bool {
    let query_re = Regex::new(r"(?i)[?&](page|p)=\d+").unwrap();
    query_re.is_match(url.as_str())
}

fn has_page_path_segment(url: &Url) -> bool {
    let path_re = Regex::new(r"(?i)/page[_-]?\d+").unwrap();
    path_re.is_match(url.path())
}

/// Whether two URLs address the same resource (identical path and query)
pub fn same_resource(a: &Url, b: &Url) -> bool {
    a.path() == b.path() && a.query() == b.query()
}

/// Hrefs that cannot be fetched: empty, fragment-only, or `javascript:`
pub fn is_noop_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:")
}

/// Lowercased attribute value, empty when absent
pub(crate) fn attr_lower(el: &ElementRef<'_>, attr: &str) -> String {
    el.value().attr(attr).unwrap_or("").to_ascii_lowercase()
}

/// Visible element text collapsed to one line
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    crate::parsers::text::normalize_inline(&el.text().collect::<Vec<_>>().join(" "))
}

/// Parse a bare page number ("3"), rejecting anything non-numeric
pub(crate) fn parse_page_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_indicator(re: &Regex, text: &str) -> Option<(u32, u32)> {
    let caps = re.captures(text)?;
    let current = caps.get(1)?.as_str().parse().ok()?;
    let total = caps.get(2)?.as_str().parse().ok()?;
    Some((current, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(html: &str, url: &str) -> PageProbe {
        PageProbe::new(html, Url::parse(url).unwrap())
    }

    #[test]
    fn test_pagination_shaped_urls() {
        let shaped = [
            "https://a.test/list?page=2",
            "https://a.test/list?p=10",
            "https://a.test/list?sort=asc&page=3",
            "https://a.test/archive/page-2",
            "https://a.test/archive/page_4",
            "https://a.test/archive/page3",
        ];
        for raw in shaped {
            assert!(
                is_pagination_shaped(&Url::parse(raw).unwrap()),
                "{} should be pagination-shaped",
                raw
            );
        }

        let unshaped = [
            "https://a.test/list",
            "https://a.test/pages/about",
            "https://a.test/list?q=page",
        ];
        for raw in unshaped {
            assert!(
                !is_pagination_shaped(&Url::parse(raw).unwrap()),
                "{} should not be pagination-shaped",
                raw
            );
        }
    }

    #[test]
    fn test_same_resource_ignores_fragment() {
        let a = Url::parse("https://a.test/list?page=1#top").unwrap();
        let b = Url::parse("https://a.test/list?page=1").unwrap();
        let c = Url::parse("https://a.test/list?page=2").unwrap();
        assert!(same_resource(&a, &b));
        assert!(!same_resource(&a, &c));
    }

    #[test]
    fn test_noop_hrefs() {
        assert!(is_noop_href("#"));
        assert!(is_noop_href("#section"));
        assert!(is_noop_href(""));
        assert!(is_noop_href("javascript:void(0)"));
        assert!(is_noop_href("JavaScript:doThing()"));
        assert!(!is_noop_href("/page-2"));
        assert!(!is_noop_href("?page=2"));
    }

    #[test]
    fn test_paging_container_detection() {
        let markup = r#"<body>
            <nav class="pagination"><a href="?page=2">2</a></nav>
            <ul id="pager-list"><li>x</li></ul>
            <div class="page-numbers"><a href="?page=3">3</a></div>
            <div class="content">plain</div>
        </body>"#;
        let p = probe(markup, "https://a.test/list");
        assert_eq!(p.paging_containers().len(), 3);
    }

    #[test]
    fn test_link_candidates_from_container_and_path() {
        let markup = r#"<body>
            <nav class="pagination">
                <a href="?page=2">2</a>
                <a href="?page=3">3</a>
            </nav>
            <a href="/list?page=4">deep link</a>
            <a href="/other?page=9">other listing</a>
            <a href="https://elsewhere.test/list?page=5">offsite</a>
        </body>"#;
        let p = probe(markup, "https://a.test/list");
        let urls: Vec<String> = p
            .pagination_link_candidates()
            .iter()
            .map(|u| u.to_string())
            .collect();

        assert!(urls.contains(&"https://a.test/list?page=2".to_string()));
        assert!(urls.contains(&"https://a.test/list?page=3".to_string()));
        assert!(urls.contains(&"https://a.test/list?page=4".to_string()));
        // different host never qualifies
        assert!(!urls.iter().any(|u| u.contains("elsewhere")));
        // different path outside a paging container does not qualify
        assert!(!urls.iter().any(|u| u.contains("/other")));
    }

    #[test]
    fn test_page_indicator_only_inside_containers() {
        let markup = r##"<body>
            <p>Showing 3 of 80 products</p>
            <nav class="pagination"><a aria-current="page" href="#">2 of 7</a></nav>
        </body>"##;
        let p = probe(markup, "https://a.test/list");
        assert_eq!(p.page_indicator(), Some((2, 7)));

        let without = r#"<body><p>Showing 3 of 80 products</p></body>"#;
        let p = probe(without, "https://a.test/list");
        assert_eq!(p.page_indicator(), None);
    }

    #[test]
    fn test_current_page_marker() {
        let markup = r##"<nav class="pagination">
            <a href="#" class="page active">3</a>
            <a href="#">4</a>
        </nav>"##;
        let p = probe(markup, "https://a.test/list");
        assert_eq!(p.current_page_marker(), Some(3));
    }

    #[test]
    fn test_vendor_page_markers() {
        let markup = r#"<div class="facetwp-pager">
            <a class="facetwp-page active" data-page="2">2</a>
            <a class="facetwp-page" data-page="3">3</a>
            <a class="facetwp-page last" data-page="9">9</a>
        </div>"#;
        let p = probe(markup, "https://a.test/list");
        assert!(p.has_vendor_widget());
        assert_eq!(p.vendor_active_page(), Some(2));
        assert_eq!(p.vendor_last_page(), Some(9));
    }
}
