//! Conversion of an archived [`Story`](crate::story::Story) into HTML.
//!
//! Each post's content goes through [`paragraphs::reconstruct`], a
//! [`typography::Typographer`] and [`normalize::normalize`], in that order,
//! before [`document::Renderer`] places it in the page.

pub mod document;
pub mod images;
pub mod normalize;
pub mod paragraphs;
pub mod typography;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub use document::{RenderError, Renderer};
pub use images::local_name;
pub use normalize::{normalize, NormalizeError};
pub use paragraphs::reconstruct;
pub use typography::{PlainTypography, SmartPunctuation, Typographer, TypographyOptions};

use crate::fs_utils::{derived_file_name, write_atomic};
use crate::story::Story;

/// Render `story` and write it to `<out_dir>/<derived title>.html`.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub async fn render_to_dir(renderer: &Renderer, story: &Story, out_dir: &Path) -> Result<PathBuf> {
    let document = renderer
        .render(story)
        .with_context(|| format!("Failed to render \"{}\"", story.title))?;

    let path = out_dir.join(derived_file_name(&story.title, "html"));
    write_atomic(&path, document.as_bytes()).await?;

    info!(path = %path.display(), posts = story.posts.len(), "Wrote document");
    Ok(path)
}
