use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(about = "Extracts normalized text and links from web pages, following pagination")]
#[command(version)]
pub struct Args {
    /// URL to extract content from (omit when using --batch)
    pub url: Option<String>,

    /// CSS selector to target specific content (e.g. 'main', '.content')
    #[arg(short, long)]
    pub selector: Option<String>,

    /// Leave links out of the output
    #[arg(long)]
    pub no_links: bool,

    /// Load pages with a plain HTTP request instead of JS rendering
    #[arg(long)]
    pub no_js: bool,

    /// Wait time in seconds for JS content to load
    #[arg(long, default_value_t = 5.0)]
    pub wait_time: f64,

    /// Treat the page as paginated and bound the traversal with --max-pages
    #[arg(long)]
    pub has_pagination: bool,

    /// Maximum number of pages to extract (only used with --has-pagination)
    #[arg(long, default_value_t = 1)]
    pub max_pages: u32,

    /// Batch file: JSON array of {url, selector} entries, or one
    /// URL|SELECTOR per line
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Directory extracted content is written to
    #[arg(short, long, default_value = "content")]
    pub output_dir: PathBuf,

    /// Also write the aggregated extraction record as JSON
    #[arg(long)]
    pub json: bool,

    /// URL of the WebDriver instance used for JS rendering
    #[arg(long, default_value = "http://localhost:4444")]
    pub webdriver_url: String,
}

/// Normalizes a user-supplied URL, defaulting the scheme to https
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_adds_scheme() {
        assert_eq!(normalize_url("example.com/list"), "https://example.com/list");
        assert_eq!(
            normalize_url("http://example.com/list"),
            "http://example.com/list"
        );
        assert_eq!(
            normalize_url("  https://example.com  "),
            "https://example.com"
        );
    }
}
