use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::client::{FetchError, ThreadSource};
use crate::story::Story;

/// Integer completion percentage, reported only when it changes.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    expected: u64,
    last: u32,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(expected: u64) -> Self {
        Self { expected, last: 0 }
    }

    /// Returns the new percentage if `fetched` moved it.
    pub fn update(&mut self, fetched: usize) -> Option<u32> {
        if self.expected == 0 {
            return None;
        }
        let percent = (100 * fetched as u64 / self.expected).min(100);
        let percent = u32::try_from(percent).unwrap_or(100);
        if percent == self.last {
            return None;
        }
        self.last = percent;
        Some(percent)
    }
}

/// Fetch a whole thread: its head post, then reply pages until one is empty.
///
/// Any failed request abandons the fetch; nothing partial is returned.
///
/// # Errors
///
/// Returns an error if a request fails, a response cannot be decoded, or
/// the thread lists no authors.
pub async fn fetch_story<S: ThreadSource + ?Sized>(
    source: &S,
    post_id: u64,
    mut on_progress: impl FnMut(u32) + Send,
) -> Result<Story, FetchError> {
    let site = source.site();
    let thread = source.thread(post_id).await?;
    let head_author = thread
        .authors
        .first()
        .ok_or(FetchError::NoAuthors(post_id))?;

    info!(
        post_id,
        title = %thread.subject,
        num_replies = thread.num_replies,
        "Fetching thread"
    );

    let mut posts = vec![thread.to_post(site, head_author)];
    // Replies are numbered apart from posts, so only reply ids are tracked here.
    let mut seen: HashSet<i64> = HashSet::new();
    let mut progress = ProgressTracker::new(thread.num_replies);

    let mut page = 1u32;
    loop {
        let replies = source.replies(post_id, page).await?;
        debug!(post_id, page, count = replies.len(), "Fetched reply page");
        if replies.is_empty() {
            break;
        }

        for reply in &replies {
            if reply.id == thread.id {
                warn!(
                    post_id,
                    reply_id = reply.id,
                    page,
                    "Skipping reply whose id collides with the thread id"
                );
                continue;
            }
            if !seen.insert(reply.id) {
                warn!(post_id, reply_id = reply.id, page, "Skipping repeated reply");
                continue;
            }
            posts.push(reply.to_post(site));
        }

        if let Some(percent) = progress.update(posts.len()) {
            debug!(post_id, percent, "Fetch progress");
            on_progress(percent);
        }
        page += 1;
    }

    info!(post_id, posts = posts.len(), pages = page, "Fetched thread");

    Ok(Story {
        title: thread.subject.clone(),
        authors: thread.author_names(),
        comments_url: site.post_url(thread.id),
        posts,
    })
}
