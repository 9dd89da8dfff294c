pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::results::Link;

/// Result of extracting one page's markup: normalized text with links shown
/// inline, plus the page's outbound links as a separate list.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Extracted text content, one semantic block per line
    pub text: String,

    /// Outbound links in document order, deduplicated by absolute URL
    pub links: Vec<Link>,
}

impl ExtractedContent {
    /// Creates a new extracted content value
    pub fn new(text: String, links: Vec<Link>) -> Self {
        Self { text, links }
    }

    /// Whether the extraction produced no usable text
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
