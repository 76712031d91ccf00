//! Structured view of the summarizer's free-form reply.
//!
//! The summarizer is asked for markdown, but nothing guarantees its layout.
//! Extraction is therefore best effort: the rendered HTML is always produced,
//! while categories and the key-takeaways summary are scraped heuristically
//! and may come back empty. Extraction never fails.

use crate::models::{AnalysisView, Categories, CategoryArticle};
use crate::utils::LINE_CHAR;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use tracing::debug;

/// Line some summarizer wrappers prepend to their output.
pub const PREAMBLE: &str = "Getting recommendations from Deepseek";

pub const NOT_AVAILABLE: &str = "Analysis not available";

const CATEGORY_MARKER: &str = "### **";
const KEY_TAKEAWAYS_HEADING: &str = "### **Key Takeaways:**";

static CATEGORY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"### \*\*({LINE_CHAR}*?)\*\*")).unwrap());
static ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\*\*({LINE_CHAR}*?)\*\*\s*\n\s*\[Link\]\(({LINE_CHAR}*?)\)"
    ))
    .unwrap()
});

/// Strategy turning summarizer text into an [`AnalysisView`].
pub trait AnalysisExtractor: Send + Sync {
    fn extract(&self, text: &str) -> AnalysisView;
}

/// Extractor for replies that group articles under bold level-3 headings:
///
/// ```markdown
/// ### **Geopolitics**
/// **Some headline**
/// [Link](https://example.com/story)
///
/// ### **Key Takeaways:**
/// Everything is connected.
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingExtractor;

impl AnalysisExtractor for HeadingExtractor {
    fn extract(&self, text: &str) -> AnalysisView {
        if text.is_empty() {
            return AnalysisView {
                categories: Categories::new(),
                summary: NOT_AVAILABLE.to_string(),
                html: format!("<p>{NOT_AVAILABLE}</p>"),
            };
        }

        let clean = strip_preamble(text);
        let categories = extract_categories(&clean);
        let summary = extract_summary(&clean);
        debug!(
            categories = categories.len(),
            has_summary = !summary.is_empty(),
            "Extracted analysis view"
        );
        AnalysisView {
            categories,
            summary,
            html: render_markdown(&clean),
        }
    }
}

/// Remove the first preamble line, if any, and trim surrounding whitespace.
pub fn strip_preamble(text: &str) -> String {
    let Some(pos) = text.find(PREAMBLE) else {
        return text.trim().to_string();
    };
    let after = &text[pos + PREAMBLE.len()..];
    let after = after.strip_prefix('\n').unwrap_or(after);
    format!("{}{}", &text[..pos], after).trim().to_string()
}

/// Render markdown to HTML.
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Collect the articles listed under each `### **Name**` heading.
///
/// A category spans from the first occurrence of its heading to the next
/// `### **` marker. Categories without any `**Title**` / `[Link](url)` pair
/// are left out; a repeated name keeps its first position.
pub fn extract_categories(text: &str) -> Categories {
    let mut categories = Categories::new();

    for caps in CATEGORY_HEADING.captures_iter(text) {
        let (Some(heading), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let start = text.find(heading.as_str()).unwrap_or(heading.start());
        let end = text[start + 1..]
            .find(CATEGORY_MARKER)
            .map_or(text.len(), |i| start + 1 + i);

        let articles: Vec<CategoryArticle> = ARTICLE
            .captures_iter(&text[start..end])
            .map(|a| CategoryArticle {
                title: a.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                link: a.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                description: String::new(),
            })
            .collect();

        if !articles.is_empty() {
            categories.insert_first(name.as_str().to_string(), articles);
        }
    }

    categories
}

/// Text under the `### **Key Takeaways:**` heading up to the next `###`.
pub fn extract_summary(text: &str) -> String {
    let Some(pos) = text.find(KEY_TAKEAWAYS_HEADING) else {
        return String::new();
    };
    let rest = &text[pos + KEY_TAKEAWAYS_HEADING.len()..];
    let section = rest.find("###").map_or(rest, |end| &rest[..end]);
    section.trim().to_string()
}
