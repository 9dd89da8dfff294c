use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A hyperlink discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL the link resolves to
    pub url: String,

    /// Visible link text (the raw href when the anchor had no text)
    pub text: String,

    /// The href attribute exactly as written in the markup
    pub original_href: String,
}

/// Content extracted from one page of a traversal.
///
/// Immutable once produced; appended to the session's ordered result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// URL of the page (the start URL in control-driven mode)
    pub url: String,

    /// 1-based position in the traversal, strictly increasing with no gaps
    pub page_number: u32,

    /// Normalized text, one semantic block per line, links shown inline
    pub text: String,

    /// Outbound links, deduplicated by absolute URL within the page
    pub links: Vec<Link>,
}

impl PageResult {
    /// Create a new page result
    pub fn new(url: String, page_number: u32, text: String, links: Vec<Link>) -> Self {
        Self {
            url,
            page_number,
            text,
            links,
        }
    }
}

/// Why a traversal stopped. Reasons are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The page had no detectable pagination
    SinglePage,

    /// URL mode: the pagination queue drained
    QueueExhausted,

    /// The user-requested page cap was reached
    LimitReached,

    /// The fixed safety ceiling was hit (no user cap in effect)
    SafetyCeiling,

    /// Cancellation was observed at a step boundary
    Cancelled,

    /// Control mode: extracted content stopped changing between activations
    ContentStable,

    /// Control mode: a "current X of Y" indicator proved the last page
    ExplicitLastPage,

    /// Control mode: no usable next control remained on the page
    NoNextControl,

    /// Control mode: the next control could not be triggered 3 times in a row
    ActivationFailed,
}

/// Ordered pages plus termination metadata, returned by every traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Pages in traversal order
    pub pages: Vec<PageResult>,

    /// Why the traversal ended
    pub reason: StopReason,
}

impl ExtractionOutcome {
    /// Create an outcome from collected pages and a termination reason
    pub fn new(pages: Vec<PageResult>, reason: StopReason) -> Self {
        Self { pages, reason }
    }

    /// Page texts joined in page order by exactly one blank line
    pub fn combined_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// All links across the session, deduplicated by absolute URL.
    ///
    /// First-seen entries win, preserving page order.
    pub fn combined_links(&self) -> Vec<Link> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for page in &self.pages {
            for link in &page.links {
                if seen.insert(link.url.clone()) {
                    links.push(link.clone());
                }
            }
        }
        links
    }
}

/// The persisted shape of a finished extraction, ready for an external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub job_id: String,
    pub url: String,
    pub selector: Option<String>,

    /// Page texts joined in page order by exactly one blank line
    pub content: String,

    /// Session-level deduplicated link list
    pub links: Vec<Link>,

    pub pages_extracted: usize,
    pub total_characters: usize,
    pub total_links: usize,

    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ExtractionRecord {
    /// Build the record for a finished outcome.
    ///
    /// `created_at` is the job submission time; `completed_at` is stamped here.
    pub fn from_outcome(
        job_id: &str,
        url: &str,
        selector: Option<&str>,
        outcome: &ExtractionOutcome,
        created_at: DateTime<Utc>,
    ) -> Self {
        let content = outcome.combined_text();
        let links = outcome.combined_links();
        Self {
            job_id: job_id.to_string(),
            url: url.to_string(),
            selector: selector.map(|s| s.to_string()),
            total_characters: content.chars().count(),
            total_links: links.len(),
            pages_extracted: outcome.pages.len(),
            content,
            links,
            created_at,
            completed_at: Utc::now(),
        }
    }
}
