use crate::config::ExtractionSession;
use crate::error::ActivationError;
use crate::loader::RenderSession;
use crate::pagination::next_control::NextControl;
use crate::pagination::{PageProbe, at_explicit_end, locate_next_control};
use crate::parsers::{html, text};
use crate::progress::JobProgressSink;
use crate::results::{ExtractionOutcome, PageResult, StopReason};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Consecutive activation failures tolerated before stopping
const MAX_ACTIVATION_FAILURES: u32 = 3;

/// Consecutive unchanged-content iterations that end the traversal
const STABLE_ITERATION_LIMIT: u32 = 2;

/// Characters of extracted text covered by the stall fingerprint
const FINGERPRINT_CHARS: usize = 2000;

/// Pause before retrying after a failed activation
const ACTIVATION_RETRY_DELAY: Duration = Duration::from_secs(2);

/// What to do after reading one snapshot
enum NextStep {
    Stop(StopReason),
    Activate(NextControl),
}

/// Traversal state for control-driven pagination: the page counter, the
/// stall fingerprint and the activation failure streak. All decision logic
/// is pure over markup snapshots; only activation touches the live session.
struct ControlTraversal<'a> {
    session: &'a ExtractionSession,
    sink: &'a dyn JobProgressSink,
    start: &'a Url,
    pages: Vec<PageResult>,
    previous_fingerprint: Option<[u8; 32]>,
    stable_iterations: u32,
    activation_failures: u32,
}

impl<'a> ControlTraversal<'a> {
    fn new(session: &'a ExtractionSession, sink: &'a dyn JobProgressSink, start: &'a Url) -> Self {
        Self {
            session,
            sink,
            start,
            pages: Vec::new(),
            previous_fingerprint: None,
            stable_iterations: 0,
            activation_failures: 0,
        }
    }

    /// Whether extracting another page would exceed the effective cap
    fn cap_reached(&self) -> bool {
        self.pages.len() as u32 >= self.session.page_limit()
    }

    /// Extract the current snapshot, guard against stalled content, and
    /// append the page.
    ///
    /// The fingerprint is checked before appending: when it has matched the
    /// previous iteration's for two consecutive iterations the traversal
    /// stops without appending another duplicate, so at most one duplicate
    /// copy ever lands in the results.
    fn observe(&mut self, snapshot: &str) -> Option<StopReason> {
        let content = html::extract(
            snapshot,
            self.start,
            self.session.selector.as_deref(),
            self.session.include_links,
        );
        if content.is_empty() {
            ::log::warn!("[{}] no content in current snapshot", self.session.job_id);
            return None;
        }

        let fingerprint = fingerprint_of(&content.text);
        if self.previous_fingerprint == Some(fingerprint) {
            self.stable_iterations += 1;
            if self.stable_iterations >= STABLE_ITERATION_LIMIT {
                ::log::info!(
                    "[{}] content unchanged across {} activations, reached end",
                    self.session.job_id,
                    self.stable_iterations
                );
                return Some(StopReason::ContentStable);
            }
        } else {
            self.stable_iterations = 0;
            self.previous_fingerprint = Some(fingerprint);
        }

        let number = self.pages.len() as u32 + 1;
        self.pages.push(PageResult::new(
            self.start.to_string(),
            number,
            content.text,
            content.links,
        ));
        self.sink.set_progress(
            &self.session.job_id,
            number,
            &format!("Extracting page {}...", number),
        );
        None
    }

    /// Decide the next step from the current snapshot: stop at an explicit
    /// last page, stop when no usable control remains, or activate the
    /// located control.
    fn plan(&self, snapshot: &str) -> NextStep {
        let probe = PageProbe::new(snapshot, self.start.clone());
        if at_explicit_end(&probe) {
            return NextStep::Stop(StopReason::ExplicitLastPage);
        }
        match locate_next_control(&probe) {
            Some(control) => NextStep::Activate(control),
            None => NextStep::Stop(StopReason::NoNextControl),
        }
    }
}

/// SHA-256 over a bounded prefix of the extracted text. A lossy proxy for
/// end-of-data on sites whose next control silently no-ops past the last
/// page.
fn fingerprint_of(page_text: &str) -> [u8; 32] {
    Sha256::digest(text::bounded_prefix(page_text, FINGERPRINT_CHARS).as_bytes()).into()
}

/// Stateful traversal loop for control-driven pagination, operating on one
/// persistent rendered session.
///
/// Per iteration: cancellation check, cap check, snapshot + extract with
/// the duplicate guard, explicit-end check, next-control location, then
/// activation with its settle sequence. Three consecutive activation
/// failures are natural termination. The session is assumed to already be
/// on the start page.
pub async fn run(
    session: &ExtractionSession,
    sink: &dyn JobProgressSink,
    render: &mut RenderSession,
    start: &Url,
) -> ExtractionOutcome {
    let mut traversal = ControlTraversal::new(session, sink, start);

    let reason = loop {
        if sink.is_cancelled(&session.job_id) {
            ::log::info!("[{}] extraction cancelled", session.job_id);
            break StopReason::Cancelled;
        }
        if traversal.cap_reached() {
            break session.limit_reason();
        }

        let snapshot = match render.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // no further pages are reachable once the session is gone
                ::log::error!("[{}] lost the rendered session: {}", session.job_id, e);
                break StopReason::ActivationFailed;
            }
        };

        if let Some(reason) = traversal.observe(&snapshot) {
            break reason;
        }

        match traversal.plan(&snapshot) {
            NextStep::Stop(reason) => break reason,
            NextStep::Activate(control) => match activate(render, &control).await {
                Ok(()) => traversal.activation_failures = 0,
                Err(e) => {
                    traversal.activation_failures += 1;
                    ::log::warn!(
                        "[{}] failed to trigger next control (attempt {} of {}): {}",
                        session.job_id,
                        traversal.activation_failures,
                        MAX_ACTIVATION_FAILURES,
                        e
                    );
                    if traversal.activation_failures >= MAX_ACTIVATION_FAILURES {
                        break StopReason::ActivationFailed;
                    }
                    sleep(ACTIVATION_RETRY_DELAY).await;
                }
            },
        }
    };

    ExtractionOutcome::new(traversal.pages, reason)
}

/// Trigger the control and wait out the page transition
async fn activate(
    render: &mut RenderSession,
    control: &NextControl,
) -> Result<(), ActivationError> {
    render.click_control(control).await?;
    render.settle_after_activation().await?;
    Ok(())
}
