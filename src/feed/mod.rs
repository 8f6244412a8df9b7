//! RSS/Atom feed search
//!
//! Fetches a content feed and runs simple case-insensitive filters over
//! its entries.
//!
//! ```text
//! FeedSearcher ──▶ FeedSource::fetch ──▶ parse_feed ──▶ Vec<FeedEntry>
//!      │
//!      ├── search(query, max_results)
//!      ├── latest(count)
//!      └── by_category(category, max_results)
//! ```

mod client;
mod parser;
mod search;

pub use client::{HttpFeedSource, StaticFeedSource, DEFAULT_FEED_TIMEOUT, DEFAULT_FEED_URL};
pub use parser::parse_feed;
pub use search::{
    filter_by_category, filter_by_query, take_latest, CategoryHit, FeedSearcher, LatestItem,
    SearchHit, DEFAULT_CATEGORY_RESULTS, DEFAULT_LATEST_COUNT, DEFAULT_SEARCH_RESULTS,
};

use crate::error::FeedError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single feed item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Entry title
    pub title: String,
    /// Link to the full content
    pub link: String,
    /// Description or summary text
    pub description: String,
    /// Publication date as it appears in the feed
    pub published: String,
    /// Category terms
    pub categories: Vec<String>,
}

/// Anything that can produce feed entries
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the current entries
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError>;

    /// Human-readable location, used in logs
    fn location(&self) -> &str;
}
