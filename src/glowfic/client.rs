use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::types::{RawReply, ThreadInfo};
use super::Site;
use crate::constants::USER_AGENT;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("thread {0} lists no authors")]
    NoAuthors(u64),
}

/// Where threads are read from.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    /// URL layout used to build permalinks for fetched posts.
    fn site(&self) -> &Site;

    /// Thread metadata plus its opening post.
    async fn thread(&self, post_id: u64) -> Result<ThreadInfo, FetchError>;

    /// One 1-based page of replies; empty once past the end of the thread.
    async fn replies(&self, post_id: u64, page: u32) -> Result<Vec<RawReply>, FetchError>;
}

/// HTTP client for the Glowfic JSON API.
pub struct GlowficClient {
    client: reqwest::Client,
    site: Site,
}

impl GlowficClient {
    /// Create a client for the site rooted at `site`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(site: Site, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Http {
                url: site.root().to_string(),
                source,
            })?;
        Ok(Self { client, site })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url = %url, "GET");
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(http_err)?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ThreadSource for GlowficClient {
    fn site(&self) -> &Site {
        &self.site
    }

    async fn thread(&self, post_id: u64) -> Result<ThreadInfo, FetchError> {
        self.get_json(&self.site.thread_api_url(post_id)).await
    }

    async fn replies(&self, post_id: u64, page: u32) -> Result<Vec<RawReply>, FetchError> {
        self.get_json(&self.site.replies_api_url(post_id, page)).await
    }
}
