//! Fetching threads from the Glowfic JSON API.

pub mod client;
pub mod fetcher;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub use client::{FetchError, GlowficClient, ThreadSource};
pub use fetcher::{fetch_story, ProgressTracker};

use crate::fs_utils::{derived_file_name, write_atomic};

/// URL layout of a Glowfic installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    root: String,
}

impl Site {
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn thread_api_url(&self, post_id: u64) -> String {
        format!("{}/api/v1/posts/{post_id}", self.root)
    }

    #[must_use]
    pub fn replies_api_url(&self, post_id: u64, page: u32) -> String {
        format!("{}/api/v1/posts/{post_id}/replies?page={page}", self.root)
    }

    #[must_use]
    pub fn post_url(&self, post_id: i64) -> String {
        format!("{}/posts/{post_id}", self.root)
    }

    #[must_use]
    pub fn reply_permalink(&self, reply_id: i64) -> String {
        format!("{}/replies/{reply_id}#reply-{reply_id}", self.root)
    }

    #[must_use]
    pub fn user_url(&self, user_id: i64) -> String {
        format!("{}/users/{user_id}", self.root)
    }

    #[must_use]
    pub fn character_url(&self, character_id: i64) -> String {
        format!("{}/characters/{character_id}", self.root)
    }
}

/// Fetch a thread and save it as `<out_dir>/<derived title>.json`.
///
/// # Errors
///
/// Returns an error if any request fails or the file cannot be written.
pub async fn fetch_to_dir<S: ThreadSource + ?Sized>(
    source: &S,
    post_id: u64,
    out_dir: &Path,
    on_progress: impl FnMut(u32) + Send,
) -> Result<PathBuf> {
    let story = fetch_story(source, post_id, on_progress)
        .await
        .with_context(|| format!("Failed to fetch thread {post_id}"))?;

    let path = out_dir.join(derived_file_name(&story.title, "json"));
    let json = story.to_json().context("Failed to encode story")?;
    write_atomic(&path, json.as_bytes()).await?;

    info!(path = %path.display(), posts = story.posts.len(), "Wrote story");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_urls() {
        let site = Site::new("https://www.glowfic.com/");
        assert_eq!(site.root(), "https://www.glowfic.com");
        assert_eq!(site.thread_api_url(7), "https://www.glowfic.com/api/v1/posts/7");
        assert_eq!(
            site.replies_api_url(7, 2),
            "https://www.glowfic.com/api/v1/posts/7/replies?page=2"
        );
        assert_eq!(site.post_url(7), "https://www.glowfic.com/posts/7");
        assert_eq!(
            site.reply_permalink(99),
            "https://www.glowfic.com/replies/99#reply-99"
        );
        assert_eq!(site.user_url(3), "https://www.glowfic.com/users/3");
        assert_eq!(site.character_url(4), "https://www.glowfic.com/characters/4");
    }
}
