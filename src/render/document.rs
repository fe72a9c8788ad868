//! Whole-document assembly for an archived story.

use chrono::NaiveDateTime;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use thiserror::Error;
use tracing::debug;

use super::images::image_src;
use super::normalize::{normalize, NormalizeError};
use super::paragraphs::reconstruct;
use super::typography::{SmartPunctuation, Typographer, TypographyOptions};
use crate::story::{Post, Story};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to normalize content of post {post_id}: {source}")]
    Normalize {
        post_id: i64,
        #[source]
        source: NormalizeError,
    },
}

/// Shown in place of a character name for posts without one.
pub const NO_CHARACTER: &str = "\u{2014}";

const POSTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

const STYLE: &str = "\
body{margin:8px auto;max-width:32em;padding:0 8px;text-align:left;}
pre{overflow-x:auto;}
div p{text-indent:2em;margin-top:0;margin-bottom:0}
div p:first-child{text-indent:0;}
h1{text-align:center;}
div.box{font-style:italic}
a:link, a:hover, a:active, a:visited {color:inherit;}
div.character-name{font-weight:bold}
img.icon{float:left;width:48px;height:48px;margin-right:8px}
div.spoiler{border:1px dashed;padding:0 4px}
p.spoiler-summary{font-weight:bold;text-indent:0}
hr{clear:both}
";

/// Turns a [`Story`] into a single HTML document.
pub struct Renderer {
    typographer: Box<dyn Typographer>,
    typography: TypographyOptions,
    images_subdir: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Box::new(SmartPunctuation), TypographyOptions::quotes(), "images")
    }
}

impl Renderer {
    #[must_use]
    pub fn new(
        typographer: Box<dyn Typographer>,
        typography: TypographyOptions,
        images_subdir: impl Into<String>,
    ) -> Self {
        Self {
            typographer,
            typography,
            images_subdir: images_subdir.into(),
        }
    }

    /// Render the complete document.
    ///
    /// # Errors
    ///
    /// Returns the first post whose content fails to normalize.
    pub fn render(&self, story: &Story) -> Result<String, RenderError> {
        let mut blocks = Vec::with_capacity(story.posts.len());
        for post in &story.posts {
            blocks.push(self.render_post(post)?);
        }
        debug!(title = %story.title, posts = blocks.len(), "Rendered story");

        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="theme-color" content="#000000";
                    title { (story.title) }
                    (metadata_comment(story))
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { (story.title) }
                    div { (story.authors) }
                    div { a href=(story.comments_url) { (story.comments_url) } }
                    hr;
                    @for block in blocks {
                        (block)
                    }
                    hr;
                }
            }
        };
        Ok(page.into_string())
    }

    /// Render one post block: header box, content, separator.
    ///
    /// # Errors
    ///
    /// Returns an error tagged with the post id if its content fails to normalize.
    pub fn render_post(&self, post: &Post) -> Result<Markup, RenderError> {
        let content = self.prepare_content(post)?;
        let label = post.character_ref().map_or(NO_CHARACTER, |c| c.name);

        Ok(html! {
            div id=(post.id) class="box" {
                @if let Some(icon) = &post.icon_url {
                    img class="icon" src=(image_src(&self.images_subdir, icon)) alt=(label);
                }
                div class="character-name" {
                    (label) " (" (post.author) ")"
                }
                div class="author-name" { (format_posted(&post.posted_at)) }
            }
            div class="content" {
                (PreEscaped(content))
            }
            hr;
        })
    }

    /// The content pipeline: paragraphs, then typography, then normalization.
    ///
    /// # Errors
    ///
    /// Returns an error tagged with the post id if normalization fails.
    pub fn prepare_content(&self, post: &Post) -> Result<String, RenderError> {
        let structured = reconstruct(&post.content);
        let typeset = self.typographer.apply(&structured, self.typography);
        normalize(&typeset, &post.permalink).map_err(|source| RenderError::Normalize {
            post_id: post.id,
            source,
        })
    }
}

/// `key: value` lines an ebook converter can pick out without parsing HTML.
fn metadata_comment(story: &Story) -> PreEscaped<String> {
    PreEscaped(format!(
        "<!--\nauthors: {}\ncomments: {}\ntitle: {}\n-->",
        comment_value(&story.authors),
        comment_value(&story.comments_url),
        comment_value(&story.title),
    ))
}

/// Keep a value on one line and unable to close the comment.
fn comment_value(value: &str) -> String {
    value
        .replace(['\r', '\n'], " ")
        .replace("-->", "--&gt;")
}

fn format_posted(posted: &str) -> String {
    NaiveDateTime::parse_from_str(posted, POSTED_FORMAT)
        .map_or_else(|_| posted.to_string(), |t| t.format(DISPLAY_FORMAT).to_string())
}
