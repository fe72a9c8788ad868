//! Typographic substitution over raw markup.
//!
//! The pass runs before the fragment is parsed, so implementations must
//! leave everything between `<` and `>` untouched.

/// Which substitutions to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypographyOptions {
    /// `"x"` becomes `“x”`.
    pub double_quotes: bool,
    /// `'x'` becomes `‘x’`, `don't` becomes `don’t`.
    pub single_quotes: bool,
    /// `--` becomes an en dash and `---` an em dash.
    pub dashes: bool,
    /// `...` becomes `…`.
    pub ellipses: bool,
}

impl TypographyOptions {
    /// The set used for rendered documents: curly double and single quotes.
    #[must_use]
    pub const fn quotes() -> Self {
        Self {
            double_quotes: true,
            single_quotes: true,
            dashes: false,
            ellipses: false,
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            double_quotes: true,
            single_quotes: true,
            dashes: true,
            ellipses: true,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            double_quotes: false,
            single_quotes: false,
            dashes: false,
            ellipses: false,
        }
    }
}

/// A pure text transform applied to post markup before parsing.
pub trait Typographer: Send + Sync {
    fn apply(&self, text: &str, options: TypographyOptions) -> String;
}

/// Leaves text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTypography;

impl Typographer for PlainTypography {
    fn apply(&self, text: &str, _options: TypographyOptions) -> String {
        text.to_string()
    }
}

/// Smart quotes, dashes and ellipses, skipping markup tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartPunctuation;

/// What came immediately before the current character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    /// An opening or self-contained tag such as `<i>` or `<br>`.
    Tag,
    /// A closing tag such as `</i>`; it ends a word.
    ClosingTag,
    Char(char),
}

const OPENING_CONTEXT: &[char] = &['(', '[', '{', '\u{2013}', '\u{2014}', '-', '/', '\u{201C}', '\u{2018}'];

fn opens(prev: Prev, next: Option<char>) -> bool {
    match prev {
        Prev::Start => true,
        Prev::Char(c) => c.is_whitespace() || OPENING_CONTEXT.contains(&c),
        // After a tag the quote hugs whichever side has the word.
        Prev::Tag => next.is_some_and(|c| c.is_alphanumeric() || OPENING_CONTEXT.contains(&c)),
        Prev::ClosingTag => false,
    }
}

/// State while copying a tag through verbatim.
struct TagScan {
    closing: bool,
    /// `<!...>` comments and declarations carry no attribute values.
    declaration: bool,
    /// The quote character of the attribute value being read, if any.
    quote: Option<char>,
}

impl TagScan {
    /// Feed one character; returns true on the `>` that ends the tag.
    fn end(&mut self, c: char) -> bool {
        match (self.quote, c) {
            (Some(q), _) if c == q => self.quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if !self.declaration => self.quote = Some(c),
            (None, '>') => return true,
            (None, _) => {}
        }
        false
    }
}

impl Typographer for SmartPunctuation {
    fn apply(&self, text: &str, options: TypographyOptions) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut tag: Option<TagScan> = None;
        let mut prev = Prev::Start;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if let Some(scan) = tag.as_mut() {
                out.push(c);
                if scan.end(c) {
                    prev = if scan.closing { Prev::ClosingTag } else { Prev::Tag };
                    tag = None;
                }
                i += 1;
                continue;
            }

            if c == '<' {
                tag = Some(TagScan {
                    closing: chars.get(i + 1) == Some(&'/'),
                    declaration: chars.get(i + 1) == Some(&'!'),
                    quote: None,
                });
                out.push(c);
                i += 1;
                continue;
            }

            let next = chars.get(i + 1).copied();
            let (emitted, width) = match c {
                '"' if options.double_quotes => {
                    (if opens(prev, next) { '\u{201C}' } else { '\u{201D}' }, 1)
                }
                '\'' if options.single_quotes => {
                    (if opens(prev, next) { '\u{2018}' } else { '\u{2019}' }, 1)
                }
                '-' if options.dashes && next == Some('-') => {
                    if chars.get(i + 2) == Some(&'-') {
                        ('\u{2014}', 3)
                    } else {
                        ('\u{2013}', 2)
                    }
                }
                '.' if options.ellipses && next == Some('.') && chars.get(i + 2) == Some(&'.') => {
                    ('\u{2026}', 3)
                }
                _ => (c, 1),
            };

            out.push(emitted);
            prev = Prev::Char(emitted);
            i += width;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smart(text: &str) -> String {
        SmartPunctuation.apply(text, TypographyOptions::quotes())
    }

    #[test]
    fn test_double_quotes() {
        assert_eq!(smart(r#""Hello," she said."#), "\u{201C}Hello,\u{201D} she said.");
        assert_eq!(smart(r#"a "b" c"#), "a \u{201C}b\u{201D} c");
    }

    #[test]
    fn test_apostrophes_and_single_quotes() {
        assert_eq!(smart("don't"), "don\u{2019}t");
        assert_eq!(smart("'quoted'"), "\u{2018}quoted\u{2019}");
    }

    #[test]
    fn test_tags_are_untouched() {
        let src = r#"<a href="https://x/y" title='t'>"link"</a>"#;
        assert_eq!(
            smart(src),
            "<a href=\"https://x/y\" title='t'>\u{201C}link\u{201D}</a>"
        );
    }

    #[test]
    fn test_quote_after_closing_tag() {
        assert_eq!(
            smart(r#"<p>"Go," <i>now</i>" he said.</p>"#),
            "<p>\u{201C}Go,\u{201D} <i>now</i>\u{201D} he said.</p>"
        );
    }

    #[test]
    fn test_possessive_and_close_after_emphasis() {
        assert_eq!(smart("<i>Carissa</i>'s coat"), "<i>Carissa</i>\u{2019}s coat");
        assert_eq!(
            smart(r#"He said "<b>now</b>" twice."#),
            "He said \u{201C}<b>now</b>\u{201D} twice."
        );
    }

    #[test]
    fn test_quote_opening_into_emphasis() {
        assert_eq!(smart(r#"a "<i>b</i>""#), "a \u{201C}<i>b</i>\u{201D}");
        assert_eq!(smart(r#"<p>"Hi"</p>"#), "<p>\u{201C}Hi\u{201D}</p>");
    }

    #[test]
    fn test_angle_bracket_inside_attribute_value() {
        let src = r#"<a title="a > b" href="/x">"go"</a>"#;
        assert_eq!(
            smart(src),
            "<a title=\"a > b\" href=\"/x\">\u{201C}go\u{201D}</a>"
        );
        let single = "<span title='it > that'>it's</span>";
        assert_eq!(smart(single), "<span title='it > that'>it\u{2019}s</span>");
    }

    #[test]
    fn test_apostrophe_in_comment_does_not_swallow_text() {
        assert_eq!(smart("<!-- don't -->'ok'"), "<!-- don't -->\u{2018}ok\u{2019}");
    }

    #[test]
    fn test_quotes_option_leaves_dashes_and_ellipses() {
        assert_eq!(smart("wait -- what..."), "wait -- what...");
    }

    #[test]
    fn test_dashes_and_ellipses() {
        let out = SmartPunctuation.apply("a--b---c...", TypographyOptions::all());
        assert_eq!(out, "a\u{2013}b\u{2014}c\u{2026}");
    }

    #[test]
    fn test_dash_before_quote_opens() {
        let out = SmartPunctuation.apply(r#"---"no""#, TypographyOptions::all());
        assert_eq!(out, "\u{2014}\u{201C}no\u{201D}");
    }

    #[test]
    fn test_disabled_options_are_identity() {
        let src = r#"it's "fine" -- ok..."#;
        assert_eq!(SmartPunctuation.apply(src, TypographyOptions::none()), src);
        assert_eq!(PlainTypography.apply(src, TypographyOptions::all()), src);
    }
}
