//! Feed sources

use crate::error::FeedError;
use crate::feed::{parse_feed, FeedEntry, FeedSource};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Feed searched when no URL is configured
pub const DEFAULT_FEED_URL: &str = "https://www.teradata.com/university/rss";

/// Default request timeout for feed fetches
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches a feed over HTTP(S) on every call
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    /// Create a source for `url` with the default timeout
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        Self::with_timeout(url, DEFAULT_FEED_TIMEOUT)
    }

    /// Create a source for `url` with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError> {
        info!("Fetching feed");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Feed request failed");
            return Err(FeedError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        parse_feed(&body)
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// Serves a fixed set of entries
#[derive(Debug, Clone, Default)]
pub struct StaticFeedSource {
    entries: Vec<FeedEntry>,
}

impl StaticFeedSource {
    /// Serve `entries` as-is
    pub fn new(entries: Vec<FeedEntry>) -> Self {
        Self { entries }
    }

    /// Parse `document` once and serve the result
    pub fn from_document(document: &str) -> Result<Self, FeedError> {
        Ok(Self::new(parse_feed(document)?))
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError> {
        Ok(self.entries.clone())
    }

    fn location(&self) -> &str {
        "static"
    }
}
