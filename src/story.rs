//! Archived thread data shared between the fetcher and the renderer.
//!
//! A [`Story`] is the only state persisted between the two halves. Its JSON
//! encoding is the interchange format: field names follow the on-disk
//! layout (`comments`, `posted`) and optional post attributes are omitted
//! entirely when absent.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to decode story JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("story has no posts")]
    Empty,
    #[error("post id {0} appears more than once")]
    DuplicatePost(i64),
    #[error("post {0} has a character name without a character URL (or the reverse)")]
    UnpairedCharacter(i64),
}

/// One archived thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    /// Display-joined author list, e.g. `"alice & bob"`.
    pub authors: String,
    #[serde(rename = "comments")]
    pub comments_url: String,
    /// Head post first, then replies in page order.
    pub posts: Vec<Post>,
}

/// One authored message within a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub author_url: String,
    /// Raw markup as delivered by the site.
    pub content: String,
    pub permalink: String,
    #[serde(rename = "posted")]
    pub posted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A post's character attribution, available only when name and URL are
/// both present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterRef<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

impl Post {
    #[must_use]
    pub fn character_ref(&self) -> Option<CharacterRef<'_>> {
        match (self.character.as_deref(), self.character_url.as_deref()) {
            (Some(name), Some(url)) => Some(CharacterRef { name, url }),
            _ => None,
        }
    }
}

impl Story {
    /// Check the invariants a renderer relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no posts, a post id repeats, or a post
    /// carries only half of its character attribution.
    pub fn validate(&self) -> Result<(), StoryError> {
        if self.posts.is_empty() {
            return Err(StoryError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.posts.len());
        for post in &self.posts {
            if !seen.insert(post.id) {
                return Err(StoryError::DuplicatePost(post.id));
            }
            if post.character.is_some() != post.character_url.is_some() {
                return Err(StoryError::UnpairedCharacter(post.id));
            }
        }
        Ok(())
    }

    /// Decode and validate a story from its JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the story is invalid.
    pub fn from_json(json: &str) -> Result<Self, StoryError> {
        let story: Self = serde_json::from_str(json)?;
        story.validate()?;
        Ok(story)
    }

    /// Encode the story as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, StoryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a story file written by the fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub async fn load(path: &Path) -> Result<Self, StoryError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoryError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&json)
    }
}
