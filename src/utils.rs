use chrono::Utc;

/// Convert a URL to a sanitized filename
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = url.replace("http://", "").replace("https://", "");
    name = name.replace(['/', ':', '?', '&', '=', '#', '%'], "_");
    name = name.trim_matches('_').to_string();

    // Limit filename length
    if name.len() > 100 {
        let mut end = 100;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}

/// Unique output filename for an extraction of `url`, timestamped to avoid
/// clobbering earlier runs.
pub fn output_filename(url: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename(url),
        Utc::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}
