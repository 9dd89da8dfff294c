#![allow(clippy::too_many_arguments)]

// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod loader;
pub mod pagination;
pub mod parsers;
pub mod progress;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ExtractionSession;
pub use error::ExtractError;
pub use pagination::PaginationMode;
pub use progress::JobProgressSink;
pub use results::{ExtractionOutcome, ExtractionRecord, Link, PageResult, StopReason};

use chrono::Utc;
use progress::NoopSink;
use std::sync::Arc;

/// Builder for a single extraction job.
///
/// Turns one web page, possibly spanning multiple listing pages, into
/// normalized text plus a deduplicated link list:
///
/// ```no_run
/// # async fn demo() -> Result<(), pagewalk::ExtractError> {
/// use pagewalk::Extraction;
///
/// let outcome = Extraction::new("https://example.com/listing")
///     .with_selector(".content")
///     .with_pagination(10)
///     .run()
///     .await?;
///
/// for page in &outcome.pages {
///     println!("page {}: {} chars", page.page_number, page.text.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Extraction {
    session: ExtractionSession,
    sink: Arc<dyn JobProgressSink>,
}

impl Extraction {
    /// Create a new extraction for the given start URL
    pub fn new(start_url: &str) -> Self {
        Self {
            session: ExtractionSession::new(start_url),
            sink: Arc::new(NoopSink),
        }
    }

    /// Build from an already-assembled session
    pub fn from_session(session: ExtractionSession) -> Self {
        Self {
            session,
            sink: Arc::new(NoopSink),
        }
    }

    /// Restrict extraction to elements matching a CSS selector
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.session.selector = Some(selector.into());
        self
    }

    /// Whether links are rendered inline and collected (default: true)
    pub fn with_links(mut self, include_links: bool) -> Self {
        self.session.include_links = include_links;
        self
    }

    /// Whether to render pages with JavaScript (default: true)
    pub fn with_js(mut self, use_js: bool) -> Self {
        self.session.use_js = use_js;
        self
    }

    /// Seconds to wait for JS content after each load
    pub fn with_wait_time(mut self, seconds: f64) -> Self {
        self.session.wait_time = seconds;
        self
    }

    /// Declare the page paginated and bound the traversal to `max_pages`
    pub fn with_pagination(mut self, max_pages: u32) -> Self {
        self.session.has_pagination = true;
        self.session.max_pages = max_pages;
        self
    }

    /// Set the WebDriver URL for rendered sessions
    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.session.webdriver_url = webdriver_url.into();
        self
    }

    /// Set the delay between fetches in URL-addressable traversal
    pub fn with_politeness_delay_ms(mut self, delay_ms: u64) -> Self {
        self.session.politeness_delay_ms = delay_ms;
        self
    }

    /// Key progress updates and cancellation queries by this job id
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.session.job_id = job_id.into();
        self
    }

    /// Report progress to, and poll cancellation from, this sink
    pub fn with_progress(mut self, sink: Arc<dyn JobProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run the extraction and return the ordered pages plus termination
    /// metadata
    pub async fn run(mut self) -> Result<ExtractionOutcome, ExtractError> {
        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.session.webdriver_url = webdriver_url;
            }
        }

        crawlers::run_extraction(&self.session, self.sink.as_ref()).await
    }

    /// Run the extraction and aggregate the outcome into a persistable
    /// record
    pub async fn run_to_record(self) -> Result<ExtractionRecord, ExtractError> {
        let created_at = Utc::now();
        let job_id = self.session.job_id.clone();
        let start_url = self.session.start_url.clone();
        let selector = self.session.selector.clone();

        let outcome = self.run().await?;
        Ok(ExtractionRecord::from_outcome(
            &job_id,
            &start_url,
            selector.as_deref(),
            &outcome,
            created_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assembles_session() {
        let extraction = Extraction::new("https://a.test/list")
            .with_selector(".content")
            .with_links(false)
            .with_js(false)
            .with_wait_time(2.0)
            .with_pagination(7)
            .with_politeness_delay_ms(100)
            .with_job_id("job-42");

        let session = &extraction.session;
        assert_eq!(session.start_url, "https://a.test/list");
        assert_eq!(session.selector.as_deref(), Some(".content"));
        assert!(!session.include_links);
        assert!(!session.use_js);
        assert_eq!(session.wait_time, 2.0);
        assert!(session.has_pagination);
        assert_eq!(session.max_pages, 7);
        assert_eq!(session.politeness_delay_ms, 100);
        assert_eq!(session.job_id, "job-42");
    }
}
