//! Post markup normalization.
//!
//! A post's content is parsed as an HTML fragment and written back out with
//! three changes: disclosure widgets become plain `div`/`p` pairs, every
//! link and resource reference is made absolute, and top-level nodes left
//! empty by the parser are dropped.

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node};
use thiserror::Error;
use tracing::{trace, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("fragment parser produced no root element")]
    MissingRoot,
}

/// Marker class placed on rewritten `<details>` containers.
pub const SPOILER_CLASS: &str = "spoiler";
/// Marker class placed on rewritten `<summary>` labels.
pub const SPOILER_SUMMARY_CLASS: &str = "spoiler-summary";

/// Attributes holding URLs that must be resolved against the base.
const LINK_ATTRS: &[&str] = &["href", "src", "poster", "cite", "action"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Disclosure widgets are rewritten at the top level and one level below.
const SPOILER_SCAN_DEPTH: usize = 2;

/// Normalize a post's markup, resolving relative references against `base_url`.
///
/// # Errors
///
/// Returns an error if `base_url` is not an absolute URL or the parser
/// fails to produce a fragment root.
pub fn normalize(content: &str, base_url: &str) -> Result<String, NormalizeError> {
    let base = Url::parse(base_url).map_err(|source| NormalizeError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let fragment = Html::parse_fragment(content);
    if !fragment.errors.is_empty() {
        trace!(errors = ?fragment.errors, "Recovered from markup errors");
    }

    let root = fragment
        .tree
        .root()
        .children()
        .find_map(ElementRef::wrap)
        .ok_or(NormalizeError::MissingRoot)?;

    let writer = FragmentWriter { base: &base };
    let mut out = String::with_capacity(content.len());

    for child in root.children() {
        match child.value() {
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(child) else {
                    continue;
                };
                let tail = child
                    .next_sibling()
                    .and_then(|n| n.value().as_text().map(|t| !t.is_empty()))
                    .unwrap_or(false);
                if !tail && is_structurally_empty(element) {
                    continue;
                }
                writer.write_element(element, 1, false, &mut out);
            }
            Node::Text(text) => out.push_str(&encode_text(&**text)),
            Node::Comment(comment) => push_comment(comment, &mut out),
            _ => {}
        }
    }

    Ok(out)
}

fn push_comment(comment: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}

/// No direct text and no element children.
fn is_structurally_empty(element: ElementRef<'_>) -> bool {
    !element.children().any(|child| match child.value() {
        Node::Text(text) => !text.is_empty(),
        Node::Element(_) => true,
        _ => false,
    })
}

struct FragmentWriter<'a> {
    base: &'a Url,
}

impl FragmentWriter<'_> {
    /// Serialize `element`, which sits `depth` levels below the fragment root.
    fn write_element(&self, element: ElementRef<'_>, depth: usize, in_spoiler: bool, out: &mut String) {
        let source_name = element.value().name();
        let (name, marker) = match source_name {
            "details" if depth <= SPOILER_SCAN_DEPTH => ("div", Some(SPOILER_CLASS)),
            "summary" if in_spoiler => ("p", Some(SPOILER_SUMMARY_CLASS)),
            other => (other, None),
        };
        let is_spoiler = marker == Some(SPOILER_CLASS);

        out.push('<');
        out.push_str(name);
        self.write_attrs(element, marker, out);
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        for child in element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.write_element(child_el, depth + 1, is_spoiler, out);
                    }
                }
                Node::Text(text) if RAW_TEXT_ELEMENTS.contains(&name) => out.push_str(text),
                Node::Text(text) => out.push_str(&encode_text(&**text)),
                Node::Comment(comment) => push_comment(comment, out),
                _ => {}
            }
        }

        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    fn write_attrs(&self, element: ElementRef<'_>, marker: Option<&str>, out: &mut String) {
        let mut class_written = false;

        for (attr, value) in element.value().attrs() {
            // `open` has no meaning once the widget is a plain container.
            if marker.is_some() && attr == "open" {
                continue;
            }
            let value = if attr == "class" {
                class_written = true;
                match marker {
                    Some(m) if value.split_whitespace().all(|c| c != m) => {
                        let joined = format!("{value} {m}");
                        joined.trim().to_string()
                    }
                    _ => value.to_string(),
                }
            } else if LINK_ATTRS.contains(&attr) {
                self.absolutize(value)
            } else {
                value.to_string()
            };
            out.push_str(&format!(" {attr}=\"{}\"", encode_double_quoted_attribute(&value)));
        }

        if let (Some(m), false) = (marker, class_written) {
            out.push_str(&format!(" class=\"{m}\""));
        }
    }

    fn absolutize(&self, reference: &str) -> String {
        match self.base.join(reference.trim()) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(reference = %reference, error = %e, "Leaving unresolvable reference as-is");
                reference.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.glowfic.com/replies/12#reply-12";

    fn norm(content: &str) -> String {
        normalize(content, BASE).unwrap()
    }

    #[test]
    fn test_plain_paragraphs_pass_through() {
        assert_eq!(norm("<p>Hello</p><p>World</p>"), "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn test_relative_links_become_absolute() {
        let out = norm(r#"<p><a href="/characters/3">Carissa</a> <img src="icons/a.png"></p>"#);
        assert_eq!(
            out,
            r#"<p><a href="https://www.glowfic.com/characters/3">Carissa</a> <img src="https://www.glowfic.com/replies/icons/a.png"></p>"#
        );
    }

    #[test]
    fn test_fragment_links_resolve_to_base_document() {
        let out = norm("<p><a href=\"#reply-9\">up</a></p>");
        assert_eq!(
            out,
            r#"<p><a href="https://www.glowfic.com/replies/12#reply-9">up</a></p>"#
        );
    }

    #[test]
    fn test_absolute_links_unchanged() {
        let src = r#"<p><a href="https://example.com/x?a=1&amp;b=2">x</a></p>"#;
        assert_eq!(norm(src), src);
    }

    #[test]
    fn test_no_relative_reference_survives() {
        let out = norm(
            r#"<p><a href="a">1</a><a href="../b">2</a><a href="//cdn.example/c">3</a></p><div><p><img src="/d.png">x</p></div>"#,
        );
        for attr in ["href=\"", "src=\""] {
            for piece in out.split(attr).skip(1) {
                assert!(piece.starts_with("https://"), "relative reference in {out}");
            }
        }
        assert_eq!(out.matches("https://").count(), 4);
    }

    #[test]
    fn test_details_rewritten_to_spoiler() {
        let out = norm("<details><summary>Click</summary><p>Hidden <b>text</b></p></details>");
        assert_eq!(
            out,
            r#"<div class="spoiler"><p class="spoiler-summary">Click</p><p>Hidden <b>text</b></p></div>"#
        );
    }

    #[test]
    fn test_details_in_child_rewritten() {
        let out = norm("<blockquote><details open><summary>S</summary>body</details></blockquote>");
        assert_eq!(
            out,
            r#"<blockquote><div class="spoiler"><p class="spoiler-summary">S</p>body</div></blockquote>"#
        );
    }

    #[test]
    fn test_doubly_nested_details_left_alone() {
        let out = norm("<div><div><details><summary>S</summary>x</details></div></div>");
        assert_eq!(out, "<div><div><details><summary>S</summary>x</details></div></div>");
    }

    #[test]
    fn test_existing_class_is_extended() {
        let out = norm(r#"<details class="note"><summary class="t">S</summary>x</details>"#);
        assert_eq!(
            out,
            r#"<div class="note spoiler"><p class="t spoiler-summary">S</p>x</div>"#
        );
    }

    #[test]
    fn test_empty_element_only_gives_empty_output() {
        assert_eq!(norm("<p></p>"), "");
        assert_eq!(norm("<span></span>"), "");
    }

    #[test]
    fn test_empty_paragraphs_dropped_between_content() {
        assert_eq!(norm("<p></p><p>a</p><p></p>"), "<p>a</p>");
    }

    #[test]
    fn test_empty_element_with_tail_is_kept() {
        assert_eq!(norm("<br>after"), "<br>after");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(norm("<p>a &lt; b &amp; c</p>"), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_curly_quotes_survive() {
        assert_eq!(norm("<p>\u{201C}hi\u{201D}</p>"), "<p>\u{201C}hi\u{201D}</p>");
    }

    #[test]
    fn test_param_has_no_closing_tag() {
        assert_eq!(
            norm(r#"<object><param name="movie" value="a.swf"></object>"#),
            r#"<object><param name="movie" value="a.swf"></object>"#
        );
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        assert_eq!(norm("<xmp>a < b & c</xmp>"), "<xmp>a < b & c</xmp>");
        assert_eq!(norm("<noembed>a & b</noembed>"), "<noembed>a & b</noembed>");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = normalize("<p>x</p>", "not a url").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidBaseUrl { .. }));
    }
}
