use thiserror::Error;

/// Failure of a single page load, raised by a [`crate::loader::PageLoader`].
///
/// In URL-addressable traversal a load failure only skips the affected page;
/// the start-page load is the one place it becomes fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    /// HTTP request failed (connect, timeout, or non-success status).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// WebDriver command failed while navigating or reading the page.
    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// The loader produced no usable markup.
    #[error("empty response body for {0}")]
    EmptyBody(String),
}

/// Failure to trigger a located next control on the rendered page.
///
/// Counted by the control-driven controller; three consecutive failures are
/// treated as natural termination, not an error.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// None of the control's click targets matched an element
    #[error("no click target matched the chosen control")]
    NoTargetMatched,

    /// The post-click settle sequence failed
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Terminal extraction failures surfaced to the caller.
///
/// Everything that terminates a traversal *normally* (caps, stable content,
/// missing next control, cancellation) is a [`crate::results::StopReason`],
/// not an error.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The start page could not be loaded at all.
    #[error("failed to load start page {url}: {source}")]
    StartPage {
        url: String,
        #[source]
        source: LoadError,
    },

    /// A WebDriver session could not be established.
    #[error("failed to connect to webdriver at {url}: {reason}")]
    Session { url: String, reason: String },

    /// The traversal finished without producing a single page of content.
    #[error("no content could be extracted from any page")]
    NoContent,

    /// Invalid session or batch configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
