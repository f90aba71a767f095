//! Markdown rendering for assistant replies
//!
//! Replies are rendered on the server so the browser only inserts trusted
//! markup. Raw HTML in the reply is shown as text instead of being passed
//! through, and links or images are limited to relative URLs and the
//! `http`, `https` and `mailto` schemes.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Schemes a link or image may point at; anything else is blanked
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Render markdown to HTML with raw HTML escaped and unsafe URLs removed
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keep relative URLs and allowed schemes, blank the rest
fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed("")
    }
}

fn is_safe_url(url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match compact.find([':', '/', '?', '#']) {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = &compact[..i];
            SAFE_SCHEMES
                .iter()
                .any(|safe| scheme.eq_ignore_ascii_case(safe))
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_renders_as_strong() {
        assert_eq!(render("**Hi**"), "<p><strong>Hi</strong></p>\n");
    }

    #[test]
    fn code_blocks_keep_language() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains("<code class=\"language-rust\">"));
        assert!(html.contains("fn main() {}"));
    }

    #[test]
    fn tables_and_strikethrough_are_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | ~~2~~ |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>2</del>"));
    }

    #[test]
    fn inline_html_is_escaped() {
        let html = render("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn html_blocks_are_escaped() {
        let html = render("<div onclick=\"x()\">\nhi\n</div>");
        assert!(!html.contains("<div"));
        assert!(html.contains("&lt;div"));
    }

    #[test]
    fn javascript_links_are_blanked() {
        let html = render("[click](javascript:alert(document.cookie))");
        assert!(!html.contains("javascript"), "{html}");
        assert_eq!(html, "<p><a href=\"\">click</a></p>\n");
    }

    #[test]
    fn scheme_tricks_are_blanked() {
        for source in [
            "[x](JaVaScRiPt:alert(1))",
            "[x](vbscript:msgbox(1))",
            "[x](data:text/html;base64,PHNjcmlwdD4=)",
            "<javascript:alert(1)>",
        ] {
            let html = render(source);
            assert!(html.contains("href=\"\""), "{source} -> {html}");
        }

        let html = render("![img](javascript:alert(1))");
        assert!(html.contains("src=\"\""), "{html}");
    }

    #[test]
    fn safe_links_are_kept() {
        let html = render("[docs](https://example.com/a?b=c) [mail](mailto:a@b.c) [rel](/help#top)");
        assert!(html.contains("href=\"https://example.com/a?b=c\""));
        assert!(html.contains("href=\"mailto:a@b.c\""));
        assert!(html.contains("href=\"/help#top\""));

        let html = render("![logo](images/logo.png)");
        assert!(html.contains("src=\"images/logo.png\""));
    }

    #[test]
    fn colon_after_path_is_relative() {
        assert!(is_safe_url("notes/a:b"));
        assert!(is_safe_url("?q=javascript:x"));
        assert!(!is_safe_url(" javascript:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url("java\nscript:alert(1)"));
    }

    #[test]
    fn plain_text_is_wrapped_in_paragraph() {
        assert_eq!(render("Hi there!"), "<p>Hi there!</p>\n");
    }
}
