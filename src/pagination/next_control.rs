use super::{PageProbe, attr_lower, element_text, is_noop_href, parse_page_number};
use scraper::{ElementRef, Selector};

/// A candidate "next page" control located in the markup, carrying enough
/// attributes to later derive click targets for the live session.
#[derive(Debug, Clone)]
pub struct NextControl {
    /// Visible control text, whitespace-collapsed
    pub text: String,
    /// Raw href as written, if any
    pub href: Option<String>,
    pub id: Option<String>,
    pub data_action: Option<String>,
    pub data_page: Option<String>,
    /// Reported disabled via attribute, class, or a disabled parent
    pub disabled: bool,
}

/// How to address a control on the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Css(String),
    LinkText(String),
}

impl NextControl {
    fn from_element(el: &ElementRef<'_>) -> Self {
        Self {
            text: element_text(el),
            href: el.value().attr("href").map(|h| h.trim().to_string()),
            id: el.value().attr("id").map(str::to_string),
            data_action: el.value().attr("data-action").map(str::to_string),
            data_page: el.value().attr("data-page").map(str::to_string),
            disabled: is_fully_disabled(el),
        }
    }

    /// Candidate locators for triggering this control, most specific first.
    ///
    /// Attribute values containing quotes are skipped rather than escaped;
    /// generic pagination selectors close the list as a last resort.
    pub fn click_targets(&self) -> Vec<ClickTarget> {
        let mut targets = Vec::new();
        let safe = |v: &str| !v.contains('"') && !v.contains('\\');

        if !self.text.is_empty() && self.text.len() <= 64 {
            targets.push(ClickTarget::LinkText(self.text.clone()));
        }
        if let Some(href) = &self.href {
            if !is_noop_href(href) && safe(href) {
                targets.push(ClickTarget::Css(format!(r#"a[href="{}"]"#, href)));
            }
        }
        if let Some(action) = &self.data_action {
            if safe(action) {
                targets.push(ClickTarget::Css(format!(r#"[data-action="{}"]"#, action)));
            }
        }
        if let Some(id) = &self.id {
            if safe(id) && !id.contains(char::is_whitespace) {
                targets.push(ClickTarget::Css(format!("#{}", id)));
            }
        }
        if let Some(page) = &self.data_page {
            if safe(page) {
                targets.push(ClickTarget::Css(format!(
                    r#".facetwp-page[data-page="{}"]"#,
                    page
                )));
                targets.push(ClickTarget::Css(format!(r#"[data-page="{}"]"#, page)));
            }
        }
        for css in [
            ".next a",
            ".facetwp-page.next",
            "a.facetwp-page.next",
            ".pager-next a",
            ".pagination .next",
            r#"[aria-label*="next" i]"#,
        ] {
            targets.push(ClickTarget::Css(css.to_string()));
        }
        targets
    }
}

/// Locates the control to activate for the next page: an enabled explicit
/// next control, then the numbered link current+1, then fallbacks for pages
/// without a current marker.
///
/// A control reported disabled is reconsidered enabled when a "current X of
/// Y" indicator proves more pages exist; otherwise a numbered current+1
/// link is preferred over the disabled control.
pub fn locate_next_control(probe: &PageProbe) -> Option<NextControl> {
    let current = probe
        .current_page_marker()
        .or_else(|| probe.vendor_active_page());

    if let Some(control) = find_next_candidate(probe) {
        if !control.disabled {
            return Some(control);
        }
        if let Some((cur, total)) = probe.page_indicator() {
            if cur < total {
                ::log::debug!(
                    "next control reported disabled, but indicator shows {} of {}",
                    cur,
                    total
                );
                return Some(NextControl {
                    disabled: false,
                    ..control
                });
            }
        }
        if let Some(cur) = current {
            if let Some(numbered) = find_numbered_link(probe, cur + 1) {
                ::log::debug!("next control disabled, using numbered link {}", cur + 1);
                return Some(numbered);
            }
        }
        return None;
    }

    // No explicit control: infer the next numbered link from the current
    // marker, or take the first inactive numbered link when no marker exists
    if let Some(cur) = current {
        return find_numbered_link(probe, cur + 1);
    }
    find_first_inactive_numbered(probe)
}

/// Whether the page explicitly marks itself as the last one: a "current X of
/// Y" indicator at its maximum with no usable next control remaining, or a
/// vendor widget whose active page index has reached the last.
pub fn at_explicit_end(probe: &PageProbe) -> bool {
    if let Some((current, total)) = probe.page_indicator() {
        if current >= total {
            match find_next_candidate(probe) {
                None => return true,
                Some(control) if control.disabled => {
                    if find_numbered_link(probe, current + 1).is_none() {
                        return true;
                    }
                }
                Some(_) => {}
            }
        }
    }

    if let (Some(active), Some(last)) = (probe.vendor_active_page(), probe.vendor_last_page()) {
        if active >= last {
            return true;
        }
    }
    false
}

/// First next-control candidate across the recognition patterns, in
/// priority order. Element-level disabled controls are passed over so a
/// later pattern can still match; parent-level disabling is reported on the
/// returned control instead.
pub(crate) fn find_next_candidate(probe: &PageProbe) -> Option<NextControl> {
    let doc = probe.document();

    // 1. explicit data-action="next" controls
    let action_selector = Selector::parse("a[data-action], button[data-action]").unwrap();
    for el in doc.select(&action_selector) {
        if attr_lower(&el, "data-action").contains("next") && !element_disabled(&el) {
            return Some(NextControl::from_element(&el));
        }
    }

    // 2. a link inside an element classed "next"
    let wrapper_selector = Selector::parse("li, div, span").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();
    for wrapper in doc.select(&wrapper_selector) {
        if !attr_lower(&wrapper, "class").contains("next") {
            continue;
        }
        if let Some(link) = wrapper.select(&link_selector).next() {
            if !element_disabled(&link) {
                return Some(NextControl::from_element(&link));
            }
        }
    }

    // 3. FacetWP next link carrying a page index
    let anchor_selector = Selector::parse("a").unwrap();
    for el in doc.select(&anchor_selector) {
        let class = attr_lower(&el, "class");
        if class.contains("facetwp-page")
            && class.contains("next")
            && !class.contains("disabled")
            && el.value().attr("data-page").is_some()
        {
            return Some(NextControl::from_element(&el));
        }
    }

    // 4. any page-indexed control that reads as "next"
    let indexed_selector = Selector::parse("a[data-page], button[data-page]").unwrap();
    for el in doc.select(&indexed_selector) {
        let class = attr_lower(&el, "class");
        let text = element_text(&el).to_lowercase();
        let next_ish =
            class.contains("next") || (text.contains("next") && (text.contains('»') || text.contains('>')));
        if next_ish && !element_disabled(&el) {
            return Some(NextControl::from_element(&el));
        }
    }

    // 5. common "Next" text/class/aria patterns
    let control_selector = Selector::parse("a, button").unwrap();
    let patterns: [fn(&ElementRef<'_>) -> bool; 4] = [
        |el| {
            let text = element_text(el).to_lowercase();
            text.contains("next") && text.contains("page")
        },
        |el| {
            let text = element_text(el).to_lowercase();
            !text.trim().is_empty()
                && (text.contains("next") || text.contains('»') || text.contains('>'))
        },
        |el| {
            let class = attr_lower(el, "class");
            class.contains("next") || class.contains("pager-next")
        },
        |el| attr_lower(el, "aria-label").contains("next"),
    ];
    for pattern in patterns {
        for el in doc.select(&control_selector) {
            if pattern(&el) && !element_disabled(&el) {
                return Some(NextControl::from_element(&el));
            }
        }
    }

    None
}

/// Numbered page link with exactly the given number, inside a paging
/// container
pub(crate) fn find_numbered_link(probe: &PageProbe, number: u32) -> Option<NextControl> {
    let anchor_selector = Selector::parse("a").unwrap();
    for container in probe.paging_containers() {
        for anchor in container.select(&anchor_selector) {
            if parse_page_number(&element_text(&anchor)) == Some(number) {
                return Some(NextControl::from_element(&anchor));
            }
        }
    }
    None
}

/// First numbered link above page 1 that carries no active/current marker.
/// Used when the page exposes numbered links but no current-page marker.
fn find_first_inactive_numbered(probe: &PageProbe) -> Option<NextControl> {
    let anchor_selector = Selector::parse("a").unwrap();
    for container in probe.paging_containers() {
        for anchor in container.select(&anchor_selector) {
            let Some(number) = parse_page_number(&element_text(&anchor)) else {
                continue;
            };
            if number <= 1 {
                continue;
            }
            if anchor.value().attr("aria-current").is_none()
                && !attr_lower(&anchor, "class").contains("active")
            {
                return Some(NextControl::from_element(&anchor));
            }
        }
    }
    None
}

/// Disabled at the element itself: attribute or class
fn element_disabled(el: &ElementRef<'_>) -> bool {
    el.value().attr("disabled").is_some() || attr_lower(el, "class").contains("disabled")
}

/// Disabled at the element or its nearest li/div/span parent
fn is_fully_disabled(el: &ElementRef<'_>) -> bool {
    if element_disabled(el) {
        return true;
    }
    for ancestor in el.ancestors() {
        if let Some(parent) = ElementRef::wrap(ancestor) {
            let name = parent.value().name();
            if name == "li" || name == "div" || name == "span" {
                return attr_lower(&parent, "class").contains("disabled");
            }
        }
    }
    false
}
