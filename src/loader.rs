use crate::error::{ActivationError, ExtractError, LoadError};
use crate::pagination::next_control::{ClickTarget, NextControl};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Fixed wait after the initial load settle, on top of the configured
/// wait_time
const EXTRA_LOAD_WAIT: Duration = Duration::from_secs(3);

/// Wait after scrolling, for lazy-loaded content to arrive
const LAZY_CONTENT_WAIT: Duration = Duration::from_secs(2);

/// Wait after an activation before re-reading the page
const POST_ACTIVATION_WAIT: Duration = Duration::from_secs(1);

/// Upper bound on waiting for a vendor loading indicator to clear
const LOADING_INDICATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on waiting for the vendor content template to appear
const TEMPLATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval for indicator waits
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One page-load capability: HTML for a URL, or a load failure.
///
/// Render-backed and plain-fetch loading are interchangeable behind this
/// trait; which one a session uses is configuration, not type.
#[async_trait]
pub trait PageLoader: Send {
    async fn load(&mut self, url: &Url) -> Result<String, LoadError>;
}

/// JS-capable loader owning one live WebDriver session.
///
/// The same session persists across control-driven iterations: navigation,
/// snapshots, clicks and scrolls all address the one rendered page.
pub struct RenderSession {
    client: Client,
    wait_time: Duration,
}

impl RenderSession {
    /// Connect a new WebDriver session
    pub async fn connect(webdriver_url: &str, wait_time: Duration) -> Result<Self, ExtractError> {
        match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("connected to WebDriver at {}", webdriver_url);
                Ok(Self { client, wait_time })
            }
            Err(e) => Err(ExtractError::Session {
                url: webdriver_url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Navigate to a URL and wait for dynamic content: configured wait, a
    /// fixed extra wait, then a scroll to the bottom to trigger lazy loading
    pub async fn goto_and_settle(&mut self, url: &str) -> Result<(), LoadError> {
        self.client.goto(url).await?;
        sleep(self.wait_time).await;
        sleep(EXTRA_LOAD_WAIT).await;
        self.scroll_to_bottom().await?;
        sleep(LAZY_CONTENT_WAIT).await;
        Ok(())
    }

    /// Current markup of the live page
    pub async fn snapshot(&mut self) -> Result<String, LoadError> {
        Ok(self.client.source().await?)
    }

    /// Scroll to the bottom of the page
    pub async fn scroll_to_bottom(&mut self) -> Result<(), LoadError> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight)", vec![])
            .await?;
        Ok(())
    }

    /// Trigger a located next control, trying its click targets in order.
    ///
    /// Fails only when no target could be found and clicked.
    pub async fn click_control(&mut self, control: &NextControl) -> Result<(), ActivationError> {
        for target in control.click_targets() {
            let locator = match &target {
                ClickTarget::Css(css) => Locator::Css(css.as_str()),
                ClickTarget::LinkText(text) => Locator::LinkText(text.as_str()),
            };
            if let Ok(element) = self.client.find(locator).await {
                match element.click().await {
                    Ok(()) => {
                        ::log::debug!("clicked next control via {:?}", target);
                        return Ok(());
                    }
                    Err(e) => {
                        ::log::debug!("click via {:?} failed: {}", target, e);
                    }
                }
            }
        }
        Err(ActivationError::NoTargetMatched)
    }

    /// Wait out the page transition after an activation: let any vendor
    /// loading indicator clear, apply the fixed delays, then scroll for
    /// lazy content
    pub async fn settle_after_activation(&mut self) -> Result<(), LoadError> {
        self.wait_until_gone(".facetwp-loading", LOADING_INDICATOR_TIMEOUT)
            .await;
        sleep(self.wait_time).await;
        sleep(EXTRA_LOAD_WAIT).await;
        self.wait_until_present(".facetwp-template", TEMPLATE_TIMEOUT)
            .await;
        sleep(POST_ACTIVATION_WAIT).await;
        self.scroll_to_bottom().await?;
        sleep(LAZY_CONTENT_WAIT).await;
        Ok(())
    }

    /// Poll until no element matches `css` or the timeout passes. Pages
    /// without the indicator fall through after the timeout.
    async fn wait_until_gone(&mut self, css: &str, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.client.find(Locator::Css(css)).await.is_err() {
                return;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until an element matches `css` or the timeout passes
    async fn wait_until_present(&mut self, css: &str, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.client.find(Locator::Css(css)).await.is_ok() {
                return;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Close the underlying WebDriver session
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("failed to close WebDriver session: {}", e);
        }
    }
}

#[async_trait]
impl PageLoader for RenderSession {
    async fn load(&mut self, url: &Url) -> Result<String, LoadError> {
        ::log::debug!("loading {} with JS rendering", url);
        self.goto_and_settle(url.as_str()).await?;
        self.snapshot().await
    }
}

/// Plain HTTP loader for pages that need no JS rendering.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with browser-like request headers
    pub fn new() -> Result<Self, LoadError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let client = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpFetcher {
    async fn load(&mut self, url: &Url) -> Result<String, LoadError> {
        ::log::debug!("loading {} with plain HTTP request", url);
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        if body.is_empty() {
            return Err(LoadError::EmptyBody(url.to_string()));
        }
        Ok(body)
    }
}
