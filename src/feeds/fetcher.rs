//! Feed retrieval.
//!
//! One GET per configured feed. Failures are captured into the feed's own
//! [`FeedResult::Failed`] record, so a single unreachable feed never aborts the
//! batch. Feeds are fetched one after another and results keep input order.

use crate::models::{FeedConfig, FeedResult};
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Why a single feed could not be retrieved.
///
/// The `Display` output is what ends up in the feed's `error` field.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A response arrived with a non-success status.
    #[error("HTTP {status}: {status_text}")]
    HttpStatus { status: u16, status_text: String },
    /// The request went out but no usable response came back
    /// (timeout, DNS failure, refused or reset connection).
    #[error("Network error: No response received")]
    Network(#[source] reqwest::Error),
    /// The request could not be built in the first place.
    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// Sort a transport error into a request or network failure.
    fn classify(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return FetchError::Request(err.to_string());
        }
        FetchError::Network(err)
    }

    fn from_status(status: StatusCode) -> Self {
        FetchError::HttpStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

/// HTTP client wrapper used for all feed retrievals.
///
/// Cloning is cheap; the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone, Default)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Retrieve the body of a single feed.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Request`] if `url` is not an absolute URL
    /// - [`FetchError::HttpStatus`] for any status outside 2xx
    /// - [`FetchError::Network`] when no response (or no complete body) arrives
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_feed(&self, url: &str) -> Result<String, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::Request(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::classify)?;

        // Anything outside 2xx is a failure, including unfollowed 1xx/3xx.
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        response.text().await.map_err(FetchError::Network)
    }

    /// Fetch every feed, returning exactly one result per input in input order.
    #[instrument(level = "info", skip_all, fields(count = feeds.len()))]
    pub async fn fetch_all(&self, feeds: &[FeedConfig]) -> Vec<FeedResult> {
        let results: Vec<FeedResult> = stream::iter(feeds)
            .then(|feed| async move {
                match self.fetch_feed(&feed.url).await {
                    Ok(content) => {
                        debug!(name = %feed.name, bytes = content.len(), "Fetched feed");
                        FeedResult::Fetched {
                            name: feed.name.clone(),
                            url: feed.url.clone(),
                            content,
                        }
                    }
                    Err(e) => {
                        warn!(name = %feed.name, url = %feed.url, error = %e, "Feed fetch failed");
                        FeedResult::Failed {
                            name: feed.name.clone(),
                            url: feed.url.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            })
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(total = results.len(), failed, "Fetched feeds");
        results
    }
}
