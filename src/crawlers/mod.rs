pub mod control;
pub mod url;

use crate::config::ExtractionSession;
use crate::error::ExtractError;
use crate::loader::{HttpFetcher, PageLoader, RenderSession};
use crate::pagination::{PageProbe, PaginationMode, classify};
use crate::parsers::html;
use crate::progress::JobProgressSink;
use crate::results::{ExtractionOutcome, PageResult, StopReason};
use std::time::Duration;
use ::url::Url;

/// Runs one extraction end to end: load the start page once, classify its
/// pagination, dispatch to the matching traversal controller, aggregate.
///
/// Owns no retry logic beyond what the controllers define. Zero pages
/// produced is the terminal `NoContent` failure, except when the job was
/// cancelled, which returns its (possibly empty) partial results.
pub async fn run_extraction(
    session: &ExtractionSession,
    sink: &dyn JobProgressSink,
) -> Result<ExtractionOutcome, ExtractError> {
    session.validate()?;
    let start = Url::parse(session.start_url.trim()).map_err(|e| {
        ExtractError::Config(format!("invalid start URL '{}': {}", session.start_url, e))
    })?;

    let outcome = if session.use_js {
        let wait = Duration::from_secs_f64(session.wait_time.max(0.0));
        let mut render = RenderSession::connect(&session.webdriver_url, wait).await?;
        let outcome = run_with_render(session, sink, &mut render, &start).await;
        render.close().await;
        outcome?
    } else {
        let mut fetcher = HttpFetcher::new().map_err(|e| ExtractError::StartPage {
            url: start.to_string(),
            source: e,
        })?;
        run_with_fetcher(session, sink, &mut fetcher, &start).await?
    };

    if outcome.pages.is_empty() && outcome.reason != StopReason::Cancelled {
        return Err(ExtractError::NoContent);
    }
    Ok(outcome)
}

/// Rendered path: all three pagination modes are available.
async fn run_with_render(
    session: &ExtractionSession,
    sink: &dyn JobProgressSink,
    render: &mut RenderSession,
    start: &Url,
) -> Result<ExtractionOutcome, ExtractError> {
    let start_html = render
        .load(start)
        .await
        .map_err(|e| ExtractError::StartPage {
            url: start.to_string(),
            source: e,
        })?;

    let mode = classify(&PageProbe::new(&start_html, start.clone()));
    ::log::info!("[{}] pagination mode for {}: {:?}", session.job_id, start, mode);

    Ok(match mode {
        PaginationMode::None => single_page(session, sink, start, &start_html),
        PaginationMode::UrlAddressable => {
            url::run(render, session, sink, start, Some(start_html)).await
        }
        PaginationMode::ControlDriven => control::run(session, sink, render, start).await,
    })
}

/// Plain-fetch path: control-driven pagination cannot be simulated without
/// a rendered session, so it degrades to the visible page.
async fn run_with_fetcher(
    session: &ExtractionSession,
    sink: &dyn JobProgressSink,
    fetcher: &mut HttpFetcher,
    start: &Url,
) -> Result<ExtractionOutcome, ExtractError> {
    let start_html = fetcher
        .load(start)
        .await
        .map_err(|e| ExtractError::StartPage {
            url: start.to_string(),
            source: e,
        })?;

    let mode = classify(&PageProbe::new(&start_html, start.clone()));
    ::log::info!("[{}] pagination mode for {}: {:?}", session.job_id, start, mode);

    Ok(match mode {
        PaginationMode::UrlAddressable => {
            url::run(fetcher, session, sink, start, Some(start_html)).await
        }
        PaginationMode::ControlDriven => {
            ::log::warn!(
                "[{}] control-driven pagination detected but JS rendering is disabled, \
                 extracting the visible page only",
                session.job_id
            );
            single_page(session, sink, start, &start_html)
        }
        PaginationMode::None => single_page(session, sink, start, &start_html),
    })
}

/// Single-page outcome for pages without traversable pagination
fn single_page(
    session: &ExtractionSession,
    sink: &dyn JobProgressSink,
    start: &Url,
    start_html: &str,
) -> ExtractionOutcome {
    if sink.is_cancelled(&session.job_id) {
        return ExtractionOutcome::new(Vec::new(), StopReason::Cancelled);
    }

    let content = html::extract(
        start_html,
        start,
        session.selector.as_deref(),
        session.include_links,
    );
    let mut pages = Vec::new();
    if !content.is_empty() {
        pages.push(PageResult::new(
            start.to_string(),
            1,
            content.text,
            content.links,
        ));
        sink.set_progress(&session.job_id, 1, "Extracting page 1...");
    }
    ExtractionOutcome::new(pages, StopReason::SinglePage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::progress::MemorySink;
    use crate::results::ExtractionRecord;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;

    struct FakeLoader {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageLoader for FakeLoader {
        async fn load(&mut self, url: &Url) -> Result<String, LoadError> {
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| LoadError::EmptyBody(url.to_string()))
        }
    }

    fn listing_page(item: &str) -> String {
        format!(
            r#"<html><body>
            <div class="items">{} <a href="/more">More</a></div>
            <nav class="pagination">
                <a href="?page=1">1</a><a href="?page=2">2</a><a href="?page=3">3</a>
            </nav></body></html>"#,
            item
        )
    }

    /// The full URL-addressable flow: classify the start page, traverse all
    /// three listing pages, aggregate into a record with one deduplicated
    /// link.
    #[tokio::test]
    async fn test_url_addressable_end_to_end() {
        let start = Url::parse("https://a.test/list?page=1").unwrap();
        let start_html = listing_page("first");

        let mode = classify(&PageProbe::new(&start_html, start.clone()));
        assert_eq!(mode, PaginationMode::UrlAddressable);

        let mut loader = FakeLoader {
            pages: HashMap::from([
                ("https://a.test/list?page=1".to_string(), start_html.clone()),
                ("https://a.test/list?page=2".to_string(), listing_page("second")),
                ("https://a.test/list?page=3".to_string(), listing_page("third")),
            ]),
        };
        let mut session = ExtractionSession::new("https://a.test/list?page=1");
        session.politeness_delay_ms = 0;
        let sink = MemorySink::new();

        let outcome = url::run(&mut loader, &session, &sink, &start, Some(start_html)).await;

        assert_eq!(outcome.pages.len(), 3);
        let numbers: Vec<u32> = outcome.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        // "More" appears on every page but aggregates to exactly one entry
        let combined = outcome.combined_links();
        let more: Vec<_> = combined
            .iter()
            .filter(|l| l.url == "https://a.test/more")
            .collect();
        assert_eq!(more.len(), 1);
        assert_eq!(more[0].text, "More");

        let record = ExtractionRecord::from_outcome(
            &session.job_id,
            &session.start_url,
            None,
            &outcome,
            Utc::now(),
        );
        assert_eq!(record.pages_extracted, 3);
        // one blank line between page texts
        assert_eq!(record.content.matches("\n\n").count(), 2);
    }

    #[test]
    fn test_single_page_outcome() {
        let session = ExtractionSession::new("https://a.test/article");
        let sink = MemorySink::new();
        let start = Url::parse("https://a.test/article").unwrap();

        let outcome = single_page(
            &session,
            &sink,
            &start,
            "<html><body><p>article body</p></body></html>",
        );
        assert_eq!(outcome.reason, StopReason::SinglePage);
        assert_eq!(outcome.pages.len(), 1);
        assert_eq!(outcome.pages[0].page_number, 1);
    }

    #[test]
    fn test_single_page_respects_cancellation() {
        let session = ExtractionSession::new("https://a.test/article");
        let sink = MemorySink::new();
        sink.cancel();
        let start = Url::parse("https://a.test/article").unwrap();

        let outcome = single_page(&session, &sink, &start, "<html><body><p>x</p></body></html>");
        assert_eq!(outcome.reason, StopReason::Cancelled);
        assert!(outcome.pages.is_empty());
    }
}
