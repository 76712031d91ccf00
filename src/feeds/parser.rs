//! Lightweight RSS/Atom item extraction.
//!
//! This is markup-shape text scanning, not an XML parser. It does not decode
//! entities, unwrap CDATA or understand namespaces, and the first matching
//! tag wins. Those limitations are part of the observable behavior:
//!
//! - a body with at least one `<item>…</item>` block is RSS, otherwise Atom
//! - every matched block yields exactly one [`FeedItem`]; a missing title or
//!   link becomes an empty string
//! - zero matched blocks is a valid, empty result

use crate::models::{FeedItem, FeedResult, ParsedFeed};
use crate::utils::{truncate_for_log, LINE_CHAR};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::{debug, instrument};

/// Separator placed between rendered items.
pub const ITEM_SEPARATOR: &str = "\n\n";

static RSS_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<item>.*?</item>").unwrap());
static ATOM_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<entry>.*?</entry>").unwrap());

static RSS_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"<title>({LINE_CHAR}*?)</title>")).unwrap());
static RSS_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"<link>({LINE_CHAR}*?)</link>")).unwrap());

static ATOM_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"<title[^>]*>({LINE_CHAR}*?)</title>")).unwrap());
static ATOM_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<link[^>]*href="([^"]*)"[^>]*>"#).unwrap());

/// Syndication format detected from a feed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFormat::Rss => f.write_str("RSS"),
            FeedFormat::Atom => f.write_str("Atom"),
        }
    }
}

impl FeedFormat {
    fn title_pattern(self) -> &'static Regex {
        match self {
            FeedFormat::Rss => &*RSS_TITLE,
            FeedFormat::Atom => &*ATOM_TITLE,
        }
    }

    fn link_pattern(self) -> &'static Regex {
        match self {
            FeedFormat::Rss => &*RSS_LINK,
            FeedFormat::Atom => &*ATOM_LINK,
        }
    }
}

/// Locate item/entry blocks and decide the format for the whole body.
///
/// RSS wins as soon as one `<item>` block exists; otherwise the body is
/// treated as Atom, even when no `<entry>` block matches either.
pub fn detect_format(body: &str) -> (FeedFormat, Vec<&str>) {
    let items: Vec<&str> = RSS_ITEM.find_iter(body).map(|m| m.as_str()).collect();
    if !items.is_empty() {
        return (FeedFormat::Rss, items);
    }
    let entries = ATOM_ENTRY.find_iter(body).map(|m| m.as_str()).collect();
    (FeedFormat::Atom, entries)
}

fn first_capture(pattern: &Regex, block: &str) -> String {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Pull the title and link out of one item/entry block.
pub fn extract_item(format: FeedFormat, block: &str) -> FeedItem {
    FeedItem {
        title: first_capture(format.title_pattern(), block),
        link: first_capture(format.link_pattern(), block),
    }
}

/// Extract every item of a feed body, along with the detected format.
pub fn extract_items(body: &str) -> (FeedFormat, Vec<FeedItem>) {
    let (format, blocks) = detect_format(body);
    let items = blocks
        .into_iter()
        .map(|block| extract_item(format, block))
        .collect();
    (format, items)
}

/// Render items as `title\nlink` blocks separated by a blank line.
pub fn render_items(items: &[FeedItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}\n{}", item.title, item.link))
        .join(ITEM_SEPARATOR)
}

/// Count the non-blank blocks of a rendered item string.
///
/// This re-derives the count from the joined text, so a title or link that
/// itself contains a blank line is counted as more than one block.
pub fn count_blocks(content: &str) -> usize {
    content
        .split(ITEM_SEPARATOR)
        .filter(|block| !block.trim().is_empty())
        .count()
}

/// Replace a fetched body with its normalized item text.
///
/// Failed results are returned unchanged; their error is never parsed.
#[instrument(level = "debug", skip_all, fields(name = %result.name()))]
pub fn parse_feed(result: FeedResult) -> ParsedFeed {
    let (name, url, content) = match result {
        FeedResult::Fetched { name, url, content } => (name, url, content),
        failed @ FeedResult::Failed { .. } => return failed,
    };

    debug!(
        length = content.len(),
        preview = %truncate_for_log(&content, 200),
        "Parsing feed body"
    );

    let (format, items) = extract_items(&content);
    debug!(count = items.len(), %format, "Found items");

    let content = render_items(&items);
    debug!(length = content.len(), "Parsed content");

    FeedResult::Fetched { name, url, content }
}
