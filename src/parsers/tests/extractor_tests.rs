use crate::parsers::html;
use url::Url;

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://site.example/dir/page").unwrap()
    }

    #[test]
    fn test_no_anchors_means_no_links_and_no_separators() {
        let markup = "<html><body><h1>Title</h1><p>Just text.</p></body></html>";
        let result = html::extract(markup, &base(), None, true);

        assert!(result.links.is_empty());
        assert!(!result.text.contains(" — "));
        assert_eq!(result.text, "Title\nJust text.");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let markup = r#"<html><body>
            <p>Intro</p>
            <a href="/about">About us</a>
            <p>Outro</p>
        </body></html>"#;

        let first = html::extract(markup, &base(), None, true);
        let second = html::extract(markup, &base(), None, true);

        assert_eq!(first.text, second.text);
        assert_eq!(first.links, second.links);
    }

    #[test]
    fn test_relative_href_resolves_against_base() {
        let markup = r#"<a href="/about">About</a>"#;
        let result = html::extract(markup, &base(), None, true);

        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].url, "https://site.example/about");
        assert_eq!(result.links[0].original_href, "/about");
        assert_eq!(result.text, "About — https://site.example/about");
    }

    #[test]
    fn test_duplicate_urls_dedup_keeps_first_text_but_not_inline() {
        let markup = r#"<body>
            <a href="/x">First label</a>
            <a href="/x">Second label</a>
        </body>"#;
        let result = html::extract(markup, &base(), None, true);

        // one collected entry, first-seen text retained
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].text, "First label");

        // both inline occurrences survive in the text
        assert!(result.text.contains("First label — https://site.example/x"));
        assert!(result.text.contains("Second label — https://site.example/x"));
    }

    #[test]
    fn test_pseudo_targets_collapse_to_visible_text() {
        let markup = r##"<body>
            <a href="#section">Jump</a>
            <a href="javascript:void(0)">Run</a>
            <a href="mailto:a@b.example">Mail</a>
            <a href="tel:+123">Call</a>
            <p>after</p>
        </body>"##;
        let result = html::extract(markup, &base(), None, true);

        assert!(result.links.is_empty());
        assert_eq!(result.text, "Jump\nRun\nMail\nCall\nafter");
    }

    #[test]
    fn test_anchor_without_text_renders_url_alone() {
        let markup = r#"<a href="https://other.example/page"></a>"#;
        let result = html::extract(markup, &base(), None, true);

        assert_eq!(result.text, "https://other.example/page");
        // collected entry falls back to the raw href for its text
        assert_eq!(result.links[0].text, "https://other.example/page");
    }

    #[test]
    fn test_script_and_style_content_is_stripped() {
        let markup = r#"<html><head>
            <style>body { color: red; }</style>
            <script>var hidden = 1;</script>
        </head><body>
            <noscript>enable js</noscript>
            <p>visible</p>
        </body></html>"#;
        let result = html::extract(markup, &base(), None, true);

        assert_eq!(result.text, "visible");
    }

    #[test]
    fn test_nested_anchor_markup_stays_on_one_line() {
        let markup = r#"<a href="/x">More <b>details</b> here</a>"#;
        let result = html::extract(markup, &base(), None, true);

        assert_eq!(result.text, "More details here — https://site.example/x");
    }

    #[test]
    fn test_include_links_false_keeps_text_only() {
        let markup = r#"<body><a href="/x">Label</a><p>after</p></body>"#;
        let result = html::extract(markup, &base(), None, false);

        assert!(result.links.is_empty());
        assert!(!result.text.contains(" — "));
        assert!(result.text.contains("Label"));
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let markup = "<p>open paragraph <div>stray <b>bold</p></div>";
        let result = html::extract(markup, &base(), None, true);

        assert!(result.text.contains("open paragraph"));
        assert!(result.text.contains("stray"));
    }

    #[test]
    fn test_links_preserved_in_document_order() {
        let markup = r#"<body>
            <a href="/c">c</a>
            <a href="/a">a</a>
            <a href="/b">b</a>
        </body>"#;
        let result = html::extract(markup, &base(), None, true);

        let urls: Vec<_> = result.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://site.example/c",
                "https://site.example/a",
                "https://site.example/b"
            ]
        );
    }
}
