//! Text escaping and the small amount of paragraph markup used in the transcript

/// Class carried by the paragraph of a failed request
pub const ERROR_CLASS: &str = "text-red-500";

/// Escape `&`, `<` and `>`. The ampersand goes first so the entities
/// produced for the angle brackets are not escaped a second time.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape the text, then wrap every newline-delimited segment in a paragraph.
pub fn format_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    escape_html(text)
        .split('\n')
        .map(|segment| format!("<p>{}</p>", segment))
        .collect()
}

/// Markup for the turn shown when a request fails
pub fn error_markup(message: &str) -> String {
    format!(
        "<p class=\"{}\">Sorry, I encountered an error: {}</p>",
        ERROR_CLASS,
        escape_html(message)
    )
}

/// A paragraph extracted from turn markup, ready for the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayParagraph {
    pub text: String,
    pub is_error: bool,
}

/// Turn paragraph markup back into plain text paragraphs.
///
/// Only the markup this module produces is recognised. Anything outside a
/// paragraph (user turns are stored raw) is returned line by line.
pub fn markup_to_paragraphs(markup: &str) -> Vec<DisplayParagraph> {
    let mut paragraphs = Vec::new();
    let mut rest = markup;

    if !rest.starts_with("<p") {
        return markup
            .split('\n')
            .map(|line| DisplayParagraph {
                text: line.to_string(),
                is_error: false,
            })
            .collect();
    }

    while let Some(open_start) = rest.find("<p") {
        let after_open = &rest[open_start..];
        let Some(open_end) = after_open.find('>') else {
            break;
        };
        let tag = &after_open[..open_end];
        let body_start = &after_open[open_end + 1..];
        let Some(close) = body_start.find("</p>") else {
            break;
        };

        paragraphs.push(DisplayParagraph {
            text: unescape_html(&body_start[..close]),
            is_error: tag.contains(ERROR_CLASS),
        });
        rest = &body_start[close + "</p>".len()..];
    }

    paragraphs
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_metacharacters_before_wrapping() {
        assert_eq!(
            format_text("a < b && c > d"),
            "<p>a &lt; b &amp;&amp; c &gt; d</p>"
        );
    }

    #[test]
    fn does_not_double_escape_entities_it_produces() {
        let formatted = format_text("<tag>");
        assert_eq!(formatted, "<p>&lt;tag&gt;</p>");
        assert!(!formatted.contains("&amp;lt;"));
    }

    #[test]
    fn existing_entities_are_escaped_once() {
        assert_eq!(format_text("&lt;"), "<p>&amp;lt;</p>");
    }

    #[test]
    fn wraps_each_line_in_a_paragraph() {
        assert_eq!(
            format_text("first\nsecond\n\nfourth"),
            "<p>first</p><p>second</p><p></p><p>fourth</p>"
        );
    }

    #[test]
    fn empty_text_formats_to_nothing() {
        assert_eq!(format_text(""), "");
    }

    #[test]
    fn error_markup_escapes_message() {
        let markup = error_markup("<script>oops</script>");
        assert!(markup.starts_with("<p class=\"text-red-500\">"));
        assert!(markup.contains("&lt;script&gt;oops&lt;/script&gt;"));
    }

    #[test]
    fn paragraphs_round_trip_to_plain_text() {
        let paragraphs = markup_to_paragraphs(&format_text("x < y\n& z"));
        let texts: Vec<_> = paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["x < y", "& z"]);
        assert!(paragraphs.iter().all(|p| !p.is_error));
    }

    #[test]
    fn error_paragraph_is_flagged() {
        let paragraphs = markup_to_paragraphs(&error_markup("oops"));
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].is_error);
        assert_eq!(paragraphs[0].text, "Sorry, I encountered an error: oops");
    }

    #[test]
    fn raw_text_is_split_into_lines() {
        let paragraphs = markup_to_paragraphs("plain <b>\nline two");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text, "plain <b>");
    }
}
