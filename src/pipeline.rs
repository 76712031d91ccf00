//! One full analysis run: fetch → parse → aggregate → summarize.
//!
//! Every call starts from scratch. Nothing is cached between runs, and
//! concurrent callers each perform their own complete cycle.

use crate::api::{AnalysisError, Summarizer};
use crate::config::AppConfig;
use crate::extract::AnalysisExtractor;
use crate::feeds::{aggregate, FeedFetcher};
use crate::models::{AggregateStats, AnalysisReport, ParsedFeed, RawData};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No feeds found in config")]
    NoFeeds,
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    pub feeds: Vec<ParsedFeed>,
    pub stats: AggregateStats,
    /// Unstructured summarizer reply.
    pub analysis: String,
}

impl AnalysisRun {
    /// Build the client-facing payload, deriving the structured view with `extractor`.
    pub fn into_report(self, extractor: &dyn AnalysisExtractor) -> AnalysisReport {
        AnalysisReport {
            stats: self.stats,
            analysis: extractor.extract(&self.analysis),
            raw_data: RawData {
                feeds: self.feeds,
                analysis: self.analysis,
            },
        }
    }
}

/// Fail with [`PipelineError::NoFeeds`] when the configuration lists no feeds.
pub fn ensure_feeds(config: &AppConfig) -> Result<(), PipelineError> {
    if config.feeds.is_empty() {
        return Err(PipelineError::NoFeeds);
    }
    Ok(())
}

/// Fetch and parse all configured feeds, then summarize the combined text.
///
/// The summarizer is only called once every feed has been fetched and parsed.
/// Per-feed failures are kept in the returned feed list; a summarizer failure
/// fails the whole run.
///
/// # Errors
///
/// - [`PipelineError::NoFeeds`] if the configuration lists no feeds (nothing is fetched)
/// - [`PipelineError::Analysis`] if the summarizer call fails
#[instrument(level = "info", skip_all, fields(feeds = config.feeds.len()))]
pub async fn run_analysis<S: Summarizer>(
    config: &AppConfig,
    fetcher: &FeedFetcher,
    summarizer: &S,
) -> Result<AnalysisRun, PipelineError> {
    ensure_feeds(config)?;
    info!("Found {} feed(s) in config", config.feeds.len());

    let aggregation = aggregate(fetcher, &config.feeds).await;
    let analysis = summarizer.summarize(&aggregation.combined_content()).await?;

    Ok(AnalysisRun {
        feeds: aggregation.feeds,
        stats: aggregation.stats,
        analysis,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::CannedSummarizer;
    use super::*;
    use crate::extract::HeadingExtractor;
    use crate::models::FeedConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn feed_server() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<item><title>T1</title><link>L1</link></item><item><title>T2</title><link>L2</link></item>",
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn config(server: &MockServer, paths: &[&str]) -> AppConfig {
        AppConfig {
            feeds: paths
                .iter()
                .map(|p| FeedConfig {
                    name: p.trim_start_matches('/').to_string(),
                    url: format!("{}{}", server.uri(), p),
                })
                .collect(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_no_feeds_skips_summarizer() {
        let summarizer = CannedSummarizer::replying("unused");
        let err = run_analysis(&AppConfig::default(), &FeedFetcher::default(), &summarizer)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoFeeds));
        assert!(summarizer.calls().is_empty());
    }

    #[test]
    fn test_ensure_feeds() {
        assert!(matches!(
            ensure_feeds(&AppConfig::default()),
            Err(PipelineError::NoFeeds)
        ));

        let config = AppConfig {
            feeds: vec![FeedConfig {
                name: "One".to_string(),
                url: "https://example.com/rss".to_string(),
            }],
            ..AppConfig::default()
        };
        assert!(ensure_feeds(&config).is_ok());
    }

    #[tokio::test]
    async fn test_run_sends_combined_content() {
        let server = feed_server().await;
        let summarizer = CannedSummarizer::replying("### **World**\n**T1**\n[Link](L1)");

        let run = run_analysis(
            &config(&server, &["/rss", "/gone"]),
            &FeedFetcher::default(),
            &summarizer,
        )
        .await
        .unwrap();

        assert_eq!(summarizer.calls(), vec!["T1\nL1\n\nT2\nL2\n\n".to_string()]);
        assert_eq!(run.stats.total_feeds, 2);
        assert_eq!(run.stats.successful_feeds, 1);
        assert_eq!(run.stats.failed_feeds, 1);
        assert_eq!(run.stats.total_articles, 2);
        assert_eq!(run.feeds[1].error(), Some("HTTP 404: Not Found"));

        let report = run.into_report(&HeadingExtractor);
        assert_eq!(report.analysis.categories.get("World").unwrap()[0].link, "L1");
        assert_eq!(report.raw_data.feeds.len(), 2);
    }

    #[tokio::test]
    async fn test_summarizer_failure_fails_run() {
        let server = feed_server().await;
        let summarizer = CannedSummarizer::failing();

        let err = run_analysis(&config(&server, &["/rss"]), &FeedFetcher::default(), &summarizer)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Analysis(AnalysisError::EmptyResponse)));
        assert_eq!(summarizer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_all_feeds_failing_still_summarizes() {
        let server = feed_server().await;
        let summarizer = CannedSummarizer::replying("");

        let run = run_analysis(&config(&server, &["/gone"]), &FeedFetcher::default(), &summarizer)
            .await
            .unwrap();
        assert_eq!(run.stats.successful_feeds, 0);
        assert_eq!(summarizer.calls(), vec![String::new()]);

        let report = run.into_report(&HeadingExtractor);
        assert_eq!(report.analysis.summary, "Analysis not available");
    }
}
