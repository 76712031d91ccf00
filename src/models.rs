//! Data models for feeds, their fetch/parse results and the analysis payload.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedConfig`]: A configured feed (name + URL)
//! - [`FeedResult`]: Outcome of fetching (and later parsing) one feed
//! - [`FeedItem`]: A single title/link pair extracted from a feed body
//! - [`AggregateStats`]: Counters derived from a batch of parsed feeds
//! - [`AnalysisView`]: Structured view scraped from the summarizer's text
//! - [`AnalysisReport`]: The payload served by `/api/analysis`
//!
//! Field names serialize in camelCase to match what the browser client reads.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A feed as declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Display name used in logs and the failed-feeds report.
    pub name: String,
    /// Location of the RSS or Atom document.
    pub url: String,
}

/// Outcome of retrieving a single feed.
///
/// Exactly one of `content` or `error` exists. After parsing, a `Fetched`
/// value carries the normalized item text instead of the raw body; a `Failed`
/// value is passed through untouched.
///
/// Serializes untagged, so the JSON is either `{name, url, content}` or
/// `{name, url, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FeedResult {
    Fetched {
        name: String,
        url: String,
        content: String,
    },
    Failed {
        name: String,
        url: String,
        error: String,
    },
}

/// A [`FeedResult`] whose successful content has been normalized by the parser.
pub type ParsedFeed = FeedResult;

impl FeedResult {
    pub fn name(&self) -> &str {
        match self {
            FeedResult::Fetched { name, .. } | FeedResult::Failed { name, .. } => name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FeedResult::Fetched { url, .. } | FeedResult::Failed { url, .. } => url,
        }
    }

    /// Body (or normalized item text) of a successful fetch.
    pub fn content(&self) -> Option<&str> {
        match self {
            FeedResult::Fetched { content, .. } => Some(content),
            FeedResult::Failed { .. } => None,
        }
    }

    /// Human-readable failure message of a failed fetch.
    pub fn error(&self) -> Option<&str> {
        match self {
            FeedResult::Fetched { .. } => None,
            FeedResult::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FeedResult::Failed { .. })
    }
}

/// A single entry pulled out of an RSS `<item>` or Atom `<entry>`.
///
/// Missing fields are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

/// Counters computed from one batch of parsed feeds. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_feeds: usize,
    pub successful_feeds: usize,
    pub failed_feeds: usize,
    /// Sum of non-blank item blocks across successful feeds.
    pub total_articles: usize,
}

/// An article listed under a category in the summarizer's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryArticle {
    pub title: String,
    pub link: String,
    /// Always empty; kept so the browser client can render a uniform card.
    pub description: String,
}

/// Category name → article list, in the order headings appear.
///
/// Serializes as a JSON object. A name is only stored once: later headings
/// with an identical name are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(Vec<(String, Vec<CategoryArticle>)>);

impl Categories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category unless one with the same name is already present.
    /// Returns `true` when the category was added.
    pub fn insert_first(&mut self, name: String, articles: Vec<CategoryArticle>) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.0.push((name, articles));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&[CategoryArticle]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, articles)| articles.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, articles)| (name, articles)))
    }
}

/// Best-effort structured view of the summarizer's free text.
///
/// `categories` and `summary` may be empty when the text does not follow the
/// expected heading convention; `html` is always populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisView {
    pub categories: Categories,
    pub summary: String,
    pub html: String,
}

/// Unprocessed data returned alongside the structured view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawData {
    pub feeds: Vec<ParsedFeed>,
    pub analysis: String,
}

/// Response body of `GET /api/analysis`, also used for JSON reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub stats: AggregateStats,
    pub analysis: AnalysisView,
    pub raw_data: RawData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(content: &str) -> FeedResult {
        FeedResult::Fetched {
            name: "Example".to_string(),
            url: "https://example.com/rss".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_feed_result_accessors() {
        let ok = fetched("body");
        assert_eq!(ok.name(), "Example");
        assert_eq!(ok.url(), "https://example.com/rss");
        assert_eq!(ok.content(), Some("body"));
        assert_eq!(ok.error(), None);
        assert!(!ok.is_failed());

        let failed = FeedResult::Failed {
            name: "Broken".to_string(),
            url: "https://broken.example".to_string(),
            error: "HTTP 500: Internal Server Error".to_string(),
        };
        assert_eq!(failed.content(), None);
        assert_eq!(failed.error(), Some("HTTP 500: Internal Server Error"));
        assert!(failed.is_failed());
    }

    #[test]
    fn test_feed_result_serializes_without_tag() {
        let json = serde_json::to_value(fetched("T1\nL1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Example",
                "url": "https://example.com/rss",
                "content": "T1\nL1"
            })
        );

        let failed = FeedResult::Failed {
            name: "Broken".to_string(),
            url: "u".to_string(),
            error: "Network error: No response received".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["error"], "Network error: No response received");
    }

    #[test]
    fn test_feed_result_deserialization_picks_variant() {
        let failed: FeedResult =
            serde_json::from_str(r#"{"name":"a","url":"b","error":"boom"}"#).unwrap();
        assert!(failed.is_failed());

        let ok: FeedResult =
            serde_json::from_str(r#"{"name":"a","url":"b","content":""}"#).unwrap();
        assert_eq!(ok.content(), Some(""));
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = AggregateStats {
            total_feeds: 3,
            successful_feeds: 2,
            failed_feeds: 1,
            total_articles: 7,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totalFeeds"], 3);
        assert_eq!(json["successfulFeeds"], 2);
        assert_eq!(json["failedFeeds"], 1);
        assert_eq!(json["totalArticles"], 7);
    }

    #[test]
    fn test_categories_keep_heading_order() {
        let mut categories = Categories::new();
        assert!(categories.insert_first("Zeta".to_string(), vec![]));
        assert!(categories.insert_first("Alpha".to_string(), vec![]));
        assert!(!categories.insert_first("Zeta".to_string(), vec![CategoryArticle::default()]));

        assert_eq!(categories.len(), 2);
        assert_eq!(categories.get("Zeta").map(|a| a.len()), Some(0));

        let json = serde_json::to_string(&categories).unwrap();
        assert_eq!(json, r#"{"Zeta":[],"Alpha":[]}"#);
    }

    #[test]
    fn test_report_uses_raw_data_key() {
        let report = AnalysisReport {
            stats: AggregateStats::default(),
            analysis: AnalysisView::default(),
            raw_data: RawData {
                feeds: vec![fetched("")],
                analysis: "text".to_string(),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rawData"]["analysis"], "text");
        assert_eq!(json["rawData"]["feeds"][0]["name"], "Example");
        assert_eq!(json["analysis"]["categories"], serde_json::json!({}));
    }
}
