use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Collaborator that receives page-count updates and answers cancellation
/// queries for a running job.
///
/// Each traversal only ever touches its own job id, so implementations need
/// no cross-job synchronization beyond being shareable. Implementations must
/// swallow their own failures: a broken sink never aborts an extraction.
pub trait JobProgressSink: Send + Sync {
    /// Record that `page_count` pages have been extracted so far
    fn set_progress(&self, job_id: &str, page_count: u32, message: &str);

    /// Whether the job has been cancelled by the caller
    fn is_cancelled(&self, job_id: &str) -> bool;
}

/// Sink that ignores progress and never cancels.
pub struct NoopSink;

impl JobProgressSink for NoopSink {
    fn set_progress(&self, _job_id: &str, _page_count: u32, _message: &str) {}

    fn is_cancelled(&self, _job_id: &str) -> bool {
        false
    }
}

/// Sink that logs progress updates. Used by the CLI.
pub struct LogSink;

impl JobProgressSink for LogSink {
    fn set_progress(&self, job_id: &str, page_count: u32, message: &str) {
        ::log::info!("[{}] {} ({} page(s))", job_id, message, page_count);
    }

    fn is_cancelled(&self, _job_id: &str) -> bool {
        false
    }
}

/// In-memory sink for embedding and tests.
///
/// Cancellation is a shared flag flipped with [`MemorySink::cancel`];
/// progress updates accumulate and can be inspected afterwards.
#[derive(Default)]
pub struct MemorySink {
    cancelled: AtomicBool,
    updates: Mutex<Vec<(String, u32, String)>>,
}

impl MemorySink {
    /// Create a sink with no updates and cancellation unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the job as cancelled; observed at the next step boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Snapshot of all (job_id, page_count, message) updates received
    pub fn updates(&self) -> Vec<(String, u32, String)> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl JobProgressSink for MemorySink {
    fn set_progress(&self, job_id: &str, page_count: u32, message: &str) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push((job_id.to_string(), page_count, message.to_string()));
        }
    }

    fn is_cancelled(&self, _job_id: &str) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_updates() {
        let sink = MemorySink::new();
        sink.set_progress("job-1", 1, "Extracting page 1...");
        sink.set_progress("job-1", 2, "Extracting page 2...");

        let updates = sink.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1], ("job-1".to_string(), 2, "Extracting page 2...".to_string()));
    }

    #[test]
    fn test_memory_sink_cancellation_flag() {
        let sink = MemorySink::new();
        assert!(!sink.is_cancelled("job-1"));
        sink.cancel();
        assert!(sink.is_cancelled("job-1"));
    }

    #[test]
    fn test_noop_sink_never_cancels() {
        let sink = NoopSink;
        sink.set_progress("job-1", 1, "ignored");
        assert!(!sink.is_cancelled("job-1"));
    }
}
