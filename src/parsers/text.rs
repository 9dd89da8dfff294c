//! Plain-text normalization helpers shared by the extractor and the
//! traversal controllers.

/// Joins raw text pieces into normalized output: every piece is split on
/// newlines, each line trimmed, and empty lines dropped, so the result has
/// one non-empty block per line with no blank runs.
pub fn tidy_lines(pieces: &[String]) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for piece in pieces {
        for line in piece.lines() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed);
            }
        }
    }
    lines.join("\n")
}

/// Collapses all whitespace runs in a fragment into single spaces
pub fn normalize_inline(fragment: &str) -> String {
    fragment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of `text` (the whole text when shorter).
///
/// Bounded by characters, not bytes, so multi-byte content never splits.
pub fn bounded_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tidy_lines_drops_blank_runs() {
        let pieces = vec![
            "  First block  ".to_string(),
            "\n\n".to_string(),
            "Second\n\n\nThird".to_string(),
        ];
        assert_eq!(tidy_lines(&pieces), "First block\nSecond\nThird");
    }

    #[test]
    fn test_tidy_lines_empty_input() {
        assert_eq!(tidy_lines(&[]), "");
        assert_eq!(tidy_lines(&["   \n  ".to_string()]), "");
    }

    #[test]
    fn test_normalize_inline() {
        assert_eq!(normalize_inline("  a \t b\nc  "), "a b c");
    }

    #[test]
    fn test_bounded_prefix_by_characters() {
        assert_eq!(bounded_prefix("hello", 10), "hello");
        assert_eq!(bounded_prefix("hello", 3), "hel");
        // multi-byte characters count as one
        assert_eq!(bounded_prefix("ééééé", 3), "ééé");
    }
}
