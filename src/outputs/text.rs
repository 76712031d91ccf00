//! Plain-text rendering of a run for terminal output.

use crate::models::AnalysisView;
use crate::pipeline::AnalysisRun;
use std::fmt::Write;

/// Feed status block, failed-feeds list and the summarizer's reply.
///
/// ```text
/// === Feed Status ===
/// Successful: 2/3
/// Failed: 1/3
///
/// === Failed Feeds ===
/// Example: HTTP 404: Not Found
///
/// <analysis>
/// ```
pub fn render_run(run: &AnalysisRun) -> String {
    let stats = run.stats;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "=== Feed Status ===");
    let _ = writeln!(out, "Successful: {}/{}", stats.successful_feeds, stats.total_feeds);
    let _ = writeln!(out, "Failed: {}/{}", stats.failed_feeds, stats.total_feeds);
    let _ = writeln!(out, "Articles: {}", stats.total_articles);
    out.push('\n');

    if stats.failed_feeds > 0 {
        let _ = writeln!(out, "=== Failed Feeds ===");
        for feed in run.feeds.iter().filter(|f| f.is_failed()) {
            let _ = writeln!(out, "{}: {}", feed.name(), feed.error().unwrap_or_default());
        }
        out.push('\n');
    }

    out.push_str(&run.analysis);
    out.push('\n');
    out
}

/// Category index of an extracted view, one headline per line.
///
/// Returns an empty string when no categories were recognised.
pub fn render_categories(view: &AnalysisView) -> String {
    let categories = &view.categories;
    if categories.is_empty() {
        return String::new();
    }

    let mut out = String::from("=== Categories ===\n");
    for name in categories.names() {
        let articles = categories.get(name).unwrap_or_default();
        let _ = writeln!(out, "{name} ({})", articles.len());
        for article in articles {
            let _ = writeln!(out, "  - {} <{}>", article.title, article.link);
        }
    }
    out.push('\n');
    out
}
