//! Fetch + parse orchestration and batch statistics.

use crate::feeds::fetcher::FeedFetcher;
use crate::feeds::parser::{count_blocks, parse_feed, ITEM_SEPARATOR};
use crate::models::{AggregateStats, FeedConfig, ParsedFeed};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// Parsed feeds of one run, in configuration order, plus derived counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub feeds: Vec<ParsedFeed>,
    pub stats: AggregateStats,
}

impl Aggregation {
    pub fn from_parsed(feeds: Vec<ParsedFeed>) -> Self {
        let stats = compute_stats(&feeds);
        Self { feeds, stats }
    }

    /// Feeds whose fetch succeeded.
    pub fn successful(&self) -> impl Iterator<Item = &ParsedFeed> {
        self.feeds.iter().filter(|f| !f.is_failed())
    }

    /// Feeds whose fetch failed, with their error still attached.
    pub fn failed(&self) -> impl Iterator<Item = &ParsedFeed> {
        self.feeds.iter().filter(|f| f.is_failed())
    }

    /// Text handed to the summarizer: every feed's content joined by a blank
    /// line. A failed feed contributes an empty string at its position.
    pub fn combined_content(&self) -> String {
        self.feeds
            .iter()
            .map(|f| f.content().unwrap_or_default())
            .join(ITEM_SEPARATOR)
    }
}

/// Derive the batch counters from a set of parsed feeds.
///
/// `total_articles` counts non-blank blocks in each successful feed's joined
/// content rather than the original item count.
pub fn compute_stats(feeds: &[ParsedFeed]) -> AggregateStats {
    let failed_feeds = feeds.iter().filter(|f| f.is_failed()).count();
    let total_articles = feeds.iter().filter_map(|f| f.content()).map(count_blocks).sum();

    AggregateStats {
        total_feeds: feeds.len(),
        successful_feeds: feeds.len() - failed_feeds,
        failed_feeds,
        total_articles,
    }
}

/// Fetch and parse every configured feed.
#[instrument(level = "info", skip_all, fields(count = feeds.len()))]
pub async fn aggregate(fetcher: &FeedFetcher, feeds: &[FeedConfig]) -> Aggregation {
    let fetched = fetcher.fetch_all(feeds).await;
    let aggregation = Aggregation::from_parsed(fetched.into_iter().map(parse_feed).collect());

    let stats = aggregation.stats;
    info!(
        successful = stats.successful_feeds,
        failed = stats.failed_feeds,
        total = stats.total_feeds,
        articles = stats.total_articles,
        "Feed status"
    );
    for feed in aggregation.successful() {
        debug!(
            name = %feed.name(),
            articles = feed.content().map(count_blocks).unwrap_or_default(),
            "Parsed feed"
        );
    }
    for feed in aggregation.failed() {
        warn!(
            name = %feed.name(),
            url = %feed.url(),
            error = feed.error().unwrap_or_default(),
            "Failed feed"
        );
    }

    aggregation
}
