use crate::error::ExtractError;
use crate::results::StopReason;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Hard upper bound on pages per traversal when no user cap is in effect
pub const SAFETY_CEILING: u32 = 1000;

/// Fixed delay between fetches in URL-addressable traversal, milliseconds
fn default_politeness_delay_ms() -> u64 {
    2000
}

/// Parameters of one extraction job. Created once per request, immutable
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSession {
    /// URL to start extracting from
    pub start_url: String,

    /// CSS selector restricting extraction to matching elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Whether to include links in the output
    #[serde(default = "default_include_links")]
    pub include_links: bool,

    /// Whether to use JavaScript rendering
    #[serde(default = "default_use_js")]
    pub use_js: bool,

    /// Wait time in seconds for JS content to load
    #[serde(default = "default_wait_time")]
    pub wait_time: f64,

    /// Whether the page is expected to have pagination; when true,
    /// `max_pages` bounds the traversal
    #[serde(default)]
    pub has_pagination: bool,

    /// Maximum number of pages to extract (only used when `has_pagination`)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// URL of the WebDriver instance for rendered sessions
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Delay between fetches in URL-addressable traversal, milliseconds
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Identifier the progress sink keys updates by
    #[serde(default = "default_job_id")]
    pub job_id: String,
}

impl ExtractionSession {
    /// Create a session with default values for a start URL
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            selector: None,
            include_links: default_include_links(),
            use_js: default_use_js(),
            wait_time: default_wait_time(),
            has_pagination: false,
            max_pages: default_max_pages(),
            webdriver_url: default_webdriver_url(),
            politeness_delay_ms: default_politeness_delay_ms(),
            job_id: default_job_id(),
        }
    }

    /// Load a session from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let mut file =
            File::open(&path).map_err(|e| ExtractError::Config(format!("open config: {}", e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ExtractError::Config(format!("read config: {}", e)))?;

        let session: Self = serde_json::from_str(&contents)
            .map_err(|e| ExtractError::Config(format!("parse config: {}", e)))?;
        session.validate()?;
        Ok(session)
    }

    /// Check the session against the request constraints
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.start_url.trim().is_empty() {
            return Err(ExtractError::Config("start_url must not be empty".into()));
        }
        if self.max_pages < 1 {
            return Err(ExtractError::Config("max_pages must be at least 1".into()));
        }
        if !(0.0..=60.0).contains(&self.wait_time) {
            return Err(ExtractError::Config(
                "wait_time must be between 0 and 60 seconds".into(),
            ));
        }
        Ok(())
    }

    /// Effective page cap for this session: the user cap when pagination was
    /// requested, the safety ceiling otherwise
    pub fn page_limit(&self) -> u32 {
        if self.has_pagination {
            self.max_pages
        } else {
            SAFETY_CEILING
        }
    }

    /// Stop reason to report when the effective cap fires
    pub fn limit_reason(&self) -> StopReason {
        if self.has_pagination {
            StopReason::LimitReached
        } else {
            StopReason::SafetyCeiling
        }
    }
}

/// One entry of a batch extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    /// URL to extract
    pub url: String,

    /// Optional CSS selector for this URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// Wrapper format: `{"urls": [...]}`
#[derive(Debug, Deserialize)]
struct BatchWrapper {
    urls: Vec<BatchEntry>,
}

/// Load batch entries from a file.
///
/// JSON files may be a plain array of entries or an object with a `urls`
/// array; any other extension is treated as text with one `URL|SELECTOR`
/// per line (`#` comments and blank lines skipped).
pub fn load_batch_file<P: AsRef<Path>>(path: P) -> Result<Vec<BatchEntry>, ExtractError> {
    let path = path.as_ref();
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|e| ExtractError::Config(format!("read batch file: {}", e)))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let entries = if is_json {
        parse_batch_json(&contents)?
    } else {
        parse_batch_lines(&contents)
    };

    if entries.is_empty() {
        return Err(ExtractError::Config("batch file contains no URLs".into()));
    }
    Ok(entries)
}

fn parse_batch_json(contents: &str) -> Result<Vec<BatchEntry>, ExtractError> {
    if let Ok(entries) = serde_json::from_str::<Vec<BatchEntry>>(contents) {
        return Ok(entries);
    }
    serde_json::from_str::<BatchWrapper>(contents)
        .map(|w| w.urls)
        .map_err(|e| ExtractError::Config(format!("parse batch JSON: {}", e)))
}

fn parse_batch_lines(contents: &str) -> Vec<BatchEntry> {
    let mut entries = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (url, selector) = match line.split_once('|') {
            Some((url, selector)) => (url.trim(), selector.trim()),
            None => (line, ""),
        };
        if url.is_empty() {
            continue;
        }
        entries.push(BatchEntry {
            url: url.to_string(),
            selector: if selector.is_empty() {
                None
            } else {
                Some(selector.to_string())
            },
        });
    }
    entries
}

/// Default value for include_links
fn default_include_links() -> bool {
    true
}

/// Default value for use_js
fn default_use_js() -> bool {
    true
}

/// Default JS wait time in seconds
fn default_wait_time() -> f64 {
    5.0
}

/// Default page cap when pagination is requested
fn default_max_pages() -> u32 {
    1
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Fresh job id for sessions created without one
fn default_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
