use crate::parsers::{ExtractedContent, text};
use crate::results::Link;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Tags whose subtrees never contribute to extracted text
const SKIP_TAGS: &[&str] = &["script", "style", "meta", "link", "noscript"];

/// Extracts normalized text and outbound links from HTML markup.
///
/// When a selector is given, extraction is restricted to the matching
/// elements; a selector that matches nothing (or fails to parse) falls back
/// to the whole document with a warning, never an error. Anchors with real
/// targets are rendered inline as `"text — absolute-url"`; fragment,
/// `javascript:`, `mailto:` and `tel:` pseudo-targets collapse to their
/// visible text.
pub fn extract(
    html: &str,
    base_url: &Url,
    selector: Option<&str>,
    include_links: bool,
) -> ExtractedContent {
    let doc = Html::parse_document(html);
    let roots = scope_roots(&doc, selector);

    let mut pieces = Vec::new();
    for root in &roots {
        collect_text(**root, base_url, include_links, &mut pieces);
    }
    let text_content = text::tidy_lines(&pieces);

    let links = if include_links {
        collect_links(&roots, base_url)
    } else {
        Vec::new()
    };

    ExtractedContent::new(text_content, links)
}

/// Resolves the extraction scope: selector matches, or the whole document.
fn scope_roots<'a>(doc: &'a Html, selector: Option<&str>) -> Vec<ElementRef<'a>> {
    if let Some(raw) = selector {
        match Selector::parse(raw) {
            Ok(sel) => {
                let matches: Vec<_> = doc.select(&sel).collect();
                if !matches.is_empty() {
                    ::log::debug!("selector '{}' matched {} element(s)", raw, matches.len());
                    return matches;
                }
                ::log::warn!(
                    "selector '{}' matched nothing, extracting from entire page",
                    raw
                );
            }
            Err(e) => {
                ::log::warn!(
                    "invalid selector '{}' ({}), extracting from entire page",
                    raw,
                    e
                );
            }
        }
    }
    vec![doc.root_element()]
}

/// Walks the tree under `node`, pushing one raw text piece per text node.
///
/// Anchors with an href are consumed whole: their replacement string is a
/// single piece so inline links never split across lines.
fn collect_text(node: NodeRef<'_, Node>, base_url: &Url, include_links: bool, pieces: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => pieces.push(t.to_string()),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                if include_links && name == "a" {
                    if el.attr("href").is_some() {
                        if let Some(elem) = ElementRef::wrap(child) {
                            if let Some(piece) = inline_anchor(elem, base_url) {
                                pieces.push(piece);
                            }
                            continue;
                        }
                    }
                }
                collect_text(child, base_url, include_links, pieces);
            }
            _ => {}
        }
    }
}

/// Inline rendering for one anchor: `"text — url"`, the URL alone when the
/// anchor has no text, or just the text for pseudo-targets.
fn inline_anchor(elem: ElementRef<'_>, base_url: &Url) -> Option<String> {
    let anchor_text = element_text(&elem);
    let href = elem.value().attr("href").unwrap_or("").trim();

    if is_pseudo_target(href) {
        return if anchor_text.is_empty() {
            None
        } else {
            Some(anchor_text)
        };
    }

    match base_url.join(href) {
        Ok(absolute) => {
            if anchor_text.is_empty() {
                Some(absolute.to_string())
            } else {
                Some(format!("{} — {}", anchor_text, absolute))
            }
        }
        // Unresolvable href, keep the visible text
        Err(_) => {
            if anchor_text.is_empty() {
                None
            } else {
                Some(anchor_text)
            }
        }
    }
}

/// Collects true outbound anchors in document order, deduplicated by
/// absolute URL. First-seen link text wins.
fn collect_links(roots: &[ElementRef<'_>], base_url: &Url) -> Vec<Link> {
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for root in roots {
        for anchor in root.select(&anchor_selector) {
            let href = anchor.value().attr("href").unwrap_or("").trim();
            if is_pseudo_target(href) {
                continue;
            }
            let Ok(absolute) = base_url.join(href) else {
                continue;
            };
            let absolute = absolute.to_string();
            if !seen.insert(absolute.clone()) {
                continue;
            }
            let anchor_text = element_text(&anchor);
            links.push(Link {
                url: absolute,
                text: if anchor_text.is_empty() {
                    href.to_string()
                } else {
                    anchor_text
                },
                original_href: href.to_string(),
            });
        }
    }
    links
}

/// Visible text of an element, whitespace-collapsed to a single line
fn element_text(elem: &ElementRef<'_>) -> String {
    text::normalize_inline(&elem.text().collect::<Vec<_>>().join(" "))
}

/// Targets that are not fetchable URLs: fragments and pseudo-schemes
fn is_pseudo_target(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return true;
    }
    let lower = href.to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("mailto:") || lower.starts_with("tel:")
}
