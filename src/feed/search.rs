//! Filters over feed entries

use crate::error::FeedError;
use crate::feed::{FeedEntry, FeedSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default `max_results` for [`FeedSearcher::search`]
pub const DEFAULT_SEARCH_RESULTS: usize = 3;
/// Default `count` for [`FeedSearcher::latest`]
pub const DEFAULT_LATEST_COUNT: usize = 5;
/// Default `max_results` for [`FeedSearcher::by_category`]
pub const DEFAULT_CATEGORY_RESULTS: usize = 5;

const SUMMARY_CHARS: usize = 200;

/// Result of a keyword search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Entry title
    pub title: String,
    /// Entry link
    pub url: String,
    /// Publication date
    pub published: String,
}

/// Recent entry with a short summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestItem {
    /// Entry title
    pub title: String,
    /// Entry link
    pub url: String,
    /// Publication date
    pub published: String,
    /// First characters of the description, suffixed with `...`
    pub summary: String,
}

/// Result of a category filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHit {
    /// Entry title
    pub title: String,
    /// Entry link
    pub url: String,
    /// The category that was asked for
    pub category_match: String,
    /// Publication date
    pub published: String,
}

/// Runs searches against a [`FeedSource`]
#[derive(Clone)]
pub struct FeedSearcher {
    source: Arc<dyn FeedSource>,
}

impl FeedSearcher {
    /// Search entries from `source`
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    /// Where entries come from
    pub fn location(&self) -> &str {
        self.source.location()
    }

    /// Entries whose title or description contains `query`, case-insensitively
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, FeedError> {
        let entries = self.source.fetch().await?;
        Ok(filter_by_query(&entries, query, max_results))
    }

    /// The first `count` entries in feed order
    #[instrument(skip(self))]
    pub async fn latest(&self, count: usize) -> Result<Vec<LatestItem>, FeedError> {
        let entries = self.source.fetch().await?;
        Ok(take_latest(&entries, count))
    }

    /// Entries matching `category` in title, description or category terms
    #[instrument(skip(self))]
    pub async fn by_category(
        &self,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<CategoryHit>, FeedError> {
        let entries = self.source.fetch().await?;
        Ok(filter_by_category(&entries, category, max_results))
    }
}

impl std::fmt::Debug for FeedSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSearcher")
            .field("source", &self.source.location())
            .finish()
    }
}

/// Keyword filter used by [`FeedSearcher::search`]
pub fn filter_by_query(entries: &[FeedEntry], query: &str, max_results: usize) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    let hits: Vec<SearchHit> = entries
        .iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
        })
        .take(max_results.max(1))
        .map(|e| SearchHit {
            title: e.title.clone(),
            url: e.link.clone(),
            published: e.published.clone(),
        })
        .collect();
    debug!(query, hits = hits.len(), "Query filter applied");
    hits
}

/// Newest-entries view used by [`FeedSearcher::latest`]
pub fn take_latest(entries: &[FeedEntry], count: usize) -> Vec<LatestItem> {
    entries
        .iter()
        .take(count.max(1))
        .map(|e| LatestItem {
            title: e.title.clone(),
            url: e.link.clone(),
            published: e.published.clone(),
            summary: summarize(&e.description),
        })
        .collect()
}

/// Category filter used by [`FeedSearcher::by_category`]
pub fn filter_by_category(
    entries: &[FeedEntry],
    category: &str,
    max_results: usize,
) -> Vec<CategoryHit> {
    let needle = category.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            let tags = e.categories.join(" ").to_lowercase();
            e.title.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
                || tags.contains(&needle)
        })
        .take(max_results.max(1))
        .map(|e| CategoryHit {
            title: e.title.clone(),
            url: e.link.clone(),
            category_match: category.to_string(),
            published: e.published.clone(),
        })
        .collect()
}

fn summarize(description: &str) -> String {
    let mut summary: String = description.chars().take(SUMMARY_CHARS).collect();
    summary.push_str("...");
    summary
}
