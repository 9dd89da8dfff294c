use super::next_control::find_next_candidate;
use super::{PageProbe, element_text, is_noop_href, parse_page_number, same_resource};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// How further pages of a listing can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Further pages have distinct fetchable URLs
    UrlAddressable,

    /// Further pages exist only behind an in-page control that must be
    /// triggered on a rendered session
    ControlDriven,

    /// Single page, no pagination detected
    None,
}

/// One classification rule: a named predicate and the mode it decides.
struct Rule {
    name: &'static str,
    mode: PaginationMode,
    matches: fn(&PageProbe) -> bool,
}

/// Ordered rule table, first match wins. Control-driven rules run first
/// because missing real pagination is costlier than one wasted interaction.
const RULES: &[Rule] = &[
    Rule {
        name: "paging-widget-without-target",
        mode: PaginationMode::ControlDriven,
        matches: widget_controls_without_target,
    },
    Rule {
        name: "next-resolves-to-current-page",
        mode: PaginationMode::ControlDriven,
        matches: next_points_at_current_page,
    },
    Rule {
        name: "numbered-placeholder-links",
        mode: PaginationMode::ControlDriven,
        matches: numbered_placeholder_links,
    },
    Rule {
        name: "distinct-pagination-links",
        mode: PaginationMode::UrlAddressable,
        matches: has_distinct_pagination_link,
    },
];

/// Decides how an unknown page's pagination must be traversed.
pub fn classify(probe: &PageProbe) -> PaginationMode {
    for rule in RULES {
        if (rule.matches)(probe) {
            ::log::debug!("pagination rule '{}' matched for {}", rule.name, probe.base());
            return rule.mode;
        }
    }
    PaginationMode::None
}

/// A recognizable paging widget whose controls carry no resolvable target:
/// a vendor widget with a recognized next control, a page-indexed control
/// without an href, or a prev/next-styled container control whose href is a
/// no-op.
fn widget_controls_without_target(probe: &PageProbe) -> bool {
    if probe.has_vendor_widget() && find_next_candidate(probe).is_some() {
        return true;
    }

    let indexed_selector = Selector::parse("a[data-page], button[data-page]").unwrap();
    for el in probe.document().select(&indexed_selector) {
        match el.value().attr("href") {
            None => return true,
            Some(href) if is_noop_href(href) => return true,
            Some(_) => {}
        }
    }

    let anchor_selector = Selector::parse("a[href]").unwrap();
    for container in probe.paging_containers() {
        for anchor in container.select(&anchor_selector) {
            let href = anchor.value().attr("href").unwrap_or("");
            if !is_noop_href(href) {
                continue;
            }
            let text = element_text(&anchor).to_lowercase();
            if anchor.value().attr("data-action").is_some()
                || text.contains("next")
                || text.contains("prev")
            {
                return true;
            }
        }
    }
    false
}

/// A distinct next control whose resolved target is the page we are already
/// on: the URL cannot change between pages, so paging must be simulated.
fn next_points_at_current_page(probe: &PageProbe) -> bool {
    let Some(control) = find_next_candidate(probe) else {
        return false;
    };
    let Some(href) = control.href.as_deref() else {
        return false;
    };
    if is_noop_href(href) {
        return false;
    }
    match probe.base().join(href) {
        Ok(resolved) => same_resource(&resolved, probe.base()),
        Err(_) => false,
    }
}

/// Numbered page links that are no-op placeholders (`href="#"` and the like)
fn numbered_placeholder_links(probe: &PageProbe) -> bool {
    let anchor_selector = Selector::parse("a[href]").unwrap();
    for container in probe.paging_containers() {
        for anchor in container.select(&anchor_selector) {
            let href = anchor.value().attr("href").unwrap_or("");
            if is_noop_href(href) && parse_page_number(&element_text(&anchor)).is_some() {
                return true;
            }
        }
    }
    false
}

/// At least one pagination-shaped link resolves to a genuinely different URL
fn has_distinct_pagination_link(probe: &PageProbe) -> bool {
    probe
        .pagination_link_candidates()
        .iter()
        .any(|candidate| !same_resource(candidate, probe.base()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn classify_at(html: &str, url: &str) -> PaginationMode {
        classify(&PageProbe::new(html, Url::parse(url).unwrap()))
    }

    #[test]
    fn test_fragment_next_control_is_control_driven() {
        let markup = r##"<nav class="pagination">
            <a href="#">Next</a>
        </nav>"##;
        assert_eq!(
            classify_at(markup, "https://a.test/list"),
            PaginationMode::ControlDriven
        );
    }

    #[test]
    fn test_distinct_page_link_is_url_addressable() {
        let markup = r#"<nav class="pagination">
            <a href="/list?page=2">Next</a>
        </nav>"#;
        assert_eq!(
            classify_at(markup, "https://a.test/list?page=1"),
            PaginationMode::UrlAddressable
        );
    }

    #[test]
    fn test_next_resolving_to_same_url_is_control_driven() {
        let markup = r#"<nav class="pagination">
            <a href="/list?page=1" class="next">Next</a>
        </nav>"#;
        assert_eq!(
            classify_at(markup, "https://a.test/list?page=1"),
            PaginationMode::ControlDriven
        );
    }

    #[test]
    fn test_numbered_placeholders_are_control_driven() {
        let markup = r##"<ul class="pagination">
            <li><a href="#" class="active">1</a></li>
            <li><a href="#">2</a></li>
            <li><a href="#">3</a></li>
        </ul>"##;
        assert_eq!(
            classify_at(markup, "https://a.test/list"),
            PaginationMode::ControlDriven
        );
    }

    #[test]
    fn test_vendor_widget_is_control_driven() {
        let markup = r#"<div class="facetwp-template">items</div>
        <div class="facetwp-pager">
            <a class="facetwp-page active" data-page="1">1</a>
            <a class="facetwp-page" data-page="2">2</a>
            <a class="facetwp-page next" data-page="2">»</a>
        </div>"#;
        assert_eq!(
            classify_at(markup, "https://a.test/list"),
            PaginationMode::ControlDriven
        );
    }

    #[test]
    fn test_plain_page_is_none() {
        let markup = r#"<body>
            <h1>Article</h1>
            <p>No pagination at all.</p>
            <a href="/about">About</a>
        </body>"#;
        assert_eq!(
            classify_at(markup, "https://a.test/article"),
            PaginationMode::None
        );
    }

    #[test]
    fn test_decorative_numbers_do_not_classify() {
        // digits outside any paging container, fragment targets
        let markup = r##"<body>
            <div class="stats"><a href="#">42</a></div>
            <p>7 of 9 doctors agree</p>
        </body>"##;
        assert_eq!(
            classify_at(markup, "https://a.test/article"),
            PaginationMode::None
        );
    }

    #[test]
    fn test_self_referential_page_one_link_alone_is_none() {
        // the only shaped link points back at the current page
        let markup = r#"<nav class="pagination">
            <a href="/list?page=1">1</a>
        </nav>"#;
        assert_eq!(
            classify_at(markup, "https://a.test/list?page=1"),
            PaginationMode::None
        );
    }

    #[test]
    fn test_control_rules_win_over_url_rules() {
        // placeholder numbers and a real second-page link: control-driven
        // rules are checked first
        let markup = r##"<ul class="pagination">
            <li><a href="#">2</a></li>
            <li><a href="/list?page=2">skip</a></li>
        </ul>"##;
        assert_eq!(
            classify_at(markup, "https://a.test/list"),
            PaginationMode::ControlDriven
        );
    }
}
