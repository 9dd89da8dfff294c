use crate::config::ExtractionSession;
use crate::loader::PageLoader;
use crate::pagination::{PageProbe, same_resource};
use crate::parsers::html;
use crate::progress::JobProgressSink;
use crate::results::{ExtractionOutcome, PageResult, StopReason};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Queue-based traversal for URL-addressable pagination.
///
/// The queue is seeded with the start URL and only ever grows by
/// pagination-shaped links discovered on extracted pages; a visited set
/// guards re-entry. Exactly one page is in flight at any time, with a fixed
/// politeness delay between fetches. A single page's load failure is logged
/// and skipped, never fatal.
///
/// `initial_html` lets the orchestrator hand over the already-loaded start
/// page so it is not fetched twice.
pub async fn run(
    loader: &mut dyn PageLoader,
    session: &ExtractionSession,
    sink: &dyn JobProgressSink,
    start: &Url,
    initial_html: Option<String>,
) -> ExtractionOutcome {
    let mut queue: VecDeque<Url> = VecDeque::from([start.clone()]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut pages: Vec<PageResult> = Vec::new();
    let mut initial_html = initial_html;

    let limit = session.page_limit();
    let delay = Duration::from_millis(session.politeness_delay_ms);

    let reason = loop {
        // cancellation is observed before dequeuing
        if sink.is_cancelled(&session.job_id) {
            ::log::info!("[{}] extraction cancelled", session.job_id);
            break StopReason::Cancelled;
        }

        let Some(current) = queue.pop_front() else {
            break StopReason::QueueExhausted;
        };
        if !visited.insert(current.to_string()) {
            continue;
        }

        let preloaded = if current == *start {
            initial_html.take()
        } else {
            None
        };
        let page_html = match preloaded {
            Some(html) => html,
            None => match loader.load(&current).await {
                Ok(html) => html,
                Err(e) => {
                    ::log::warn!("[{}] failed to load {}, skipping: {}", session.job_id, current, e);
                    continue;
                }
            },
        };

        let content = html::extract(
            &page_html,
            &current,
            session.selector.as_deref(),
            session.include_links,
        );
        if content.is_empty() {
            ::log::warn!("[{}] no content extracted from {}, skipping", session.job_id, current);
        } else {
            let number = pages.len() as u32 + 1;
            pages.push(PageResult::new(
                current.to_string(),
                number,
                content.text,
                content.links,
            ));
            sink.set_progress(
                &session.job_id,
                number,
                &format!("Extracting page {}...", number),
            );
            if pages.len() as u32 >= limit {
                break session.limit_reason();
            }

            // discover further pagination-shaped links on this page
            let probe = PageProbe::new(&page_html, current.clone());
            let mut discovered = 0;
            for mut candidate in probe.pagination_link_candidates() {
                candidate.set_fragment(None);
                // a link back to the page that discovered it is never queued
                if same_resource(&candidate, &current) {
                    continue;
                }
                if visited.contains(candidate.as_str()) || queue.contains(&candidate) {
                    continue;
                }
                queue.push_back(candidate);
                discovered += 1;
            }
            if discovered > 0 {
                ::log::debug!(
                    "[{}] queued {} new pagination link(s) from {}",
                    session.job_id,
                    discovered,
                    current
                );
            }
        }

        if !queue.is_empty() {
            sleep(delay).await;
        }
    };

    ExtractionOutcome::new(pages, reason)
}
