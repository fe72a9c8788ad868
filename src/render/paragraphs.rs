//! Paragraph reconstruction for posts written without `<p>` markup.
//!
//! Many posts arrive as a single run of text broken up with `<br>` tags or
//! bare newlines. This pre-pass is a regex heuristic, kept separate from the
//! real fragment parser in [`super::normalize`].

use std::sync::LazyLock;

use regex::Regex;

/// Content that already has paragraph or disclosure blocks is left alone.
static HAS_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:p|details)(?:\s[^>]*)?>").unwrap());

/// Two or more line breaks (tag or newline), with any whitespace between.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:(?:<br\s*/?>|\n)\s*){2,}").unwrap());

/// Wrap unstructured content in paragraphs, splitting on runs of breaks.
///
/// A single break stays inside its paragraph.
#[must_use]
pub fn reconstruct(content: &str) -> String {
    if HAS_BLOCKS.is_match(content) {
        return content.to_string();
    }
    let body = PARAGRAPH_BREAK.replace_all(content, "</p><p>");
    format!("<p>{body}</p>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_wrapped() {
        assert_eq!(reconstruct("Hello"), "<p>Hello</p>");
    }

    #[test]
    fn test_double_br_splits() {
        assert_eq!(
            reconstruct("Line one<br><br>Line two"),
            "<p>Line one</p><p>Line two</p>"
        );
    }

    #[test]
    fn test_single_br_is_not_a_boundary() {
        assert_eq!(reconstruct("one<br>two"), "<p>one<br>two</p>");
        assert_eq!(reconstruct("one<br />two"), "<p>one<br />two</p>");
    }

    #[test]
    fn test_single_newline_is_not_a_boundary() {
        assert_eq!(reconstruct("one\ntwo"), "<p>one\ntwo</p>");
    }

    #[test]
    fn test_mixed_spellings_and_whitespace() {
        assert_eq!(
            reconstruct("a <BR/>  \n\t<br >  b"),
            "<p>a</p><p>b</p>"
        );
        assert_eq!(reconstruct("a\n\nb"), "<p>a</p><p>b</p>");
        assert_eq!(reconstruct("a<br>\n  <Br>\nb"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_existing_paragraphs_untouched() {
        let src = "<p>first</p>\n\n<p>second</p>";
        assert_eq!(reconstruct(src), src);
        let src = r#"<P class="x">shout</P><br><br>tail"#;
        assert_eq!(reconstruct(src), src);
    }

    #[test]
    fn test_existing_details_untouched() {
        let src = "<details><summary>s</summary>hidden</details><br><br>x";
        assert_eq!(reconstruct(src), src);
    }

    #[test]
    fn test_pre_is_not_a_paragraph_marker() {
        assert_eq!(reconstruct("<pre>x</pre>"), "<p><pre>x</pre></p>");
    }

    #[test]
    fn test_idempotent_once_structured() {
        for src in ["Hello", "a<br><br>b", "<p>x</p>", "a\n\n\nb<br>c"] {
            let once = reconstruct(src);
            assert_eq!(reconstruct(&once), once, "input: {src:?}");
        }
    }
}
