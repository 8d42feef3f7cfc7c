//! Feed source adapter: pull-based RSS sources with no quota concept.
//!
//! Each configured feed is fetched with a single GET and parsed as RSS 2.0
//! (`channel/item` with `title`, `link`, `pubDate`, `description`). Feed
//! failures are soft: the caller logs the [`FeedError`] and continues with
//! the remaining sources.
//!
//! A curated default feed list ships in the binary; `--sources` points at a
//! YAML file with the same shape to replace it.

use crate::models::RawRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a feed produced no records. `Empty` is distinguishable from a
/// transport failure so callers can report "feed is fine but idle"
/// separately from "feed is down".
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport, DNS, or timeout failure before any payload arrived.
    #[error("feed unreachable: {0}")]
    Unreachable(String),
    /// The payload arrived but is not parseable RSS.
    #[error("malformed feed: {0}")]
    Malformed(String),
    /// Parseable feed with zero entries.
    #[error("feed is empty: no items found")]
    Empty,
}

impl FeedError {
    /// Machine-readable kind for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Unreachable(_) => "unreachable",
            FeedError::Malformed(_) => "malformed",
            FeedError::Empty => "empty",
        }
    }
}

/// One configured feed. The optional category label classifies everything
/// the feed emits (syndication entries carry no classification of their own).
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// The built-in feed list: a spread of outlets across categories that serve
/// plain RSS without auth.
pub fn default_sources() -> Vec<FeedSource> {
    fn feed(name: &str, url: &str, category: &str) -> FeedSource {
        FeedSource {
            name: name.to_string(),
            url: url.to_string(),
            category: Some(category.to_string()),
        }
    }

    vec![
        feed("BBC World", "http://feeds.bbc.co.uk/news/world/rss.xml", "World"),
        feed("BBC Politics", "http://feeds.bbc.co.uk/news/politics/rss.xml", "Politics"),
        feed("The Guardian Politics", "https://www.theguardian.com/politics/rss", "Politics"),
        feed("Hacker News", "https://news.ycombinator.com/rss", "Technology"),
        feed("Science Daily", "https://www.sciencedaily.com/rss/all_rss.xml", "Science"),
        feed("BBC Sport", "http://feeds.bbc.co.uk/sport/rss.xml", "Sports"),
        feed("Medical News Today", "https://www.medicalnewstoday.com/rss.xml", "Health"),
        feed("Variety", "https://variety.com/feed/", "Entertainment"),
    ]
}

/// Load a replacement feed list from a YAML file.
pub fn load_sources(path: &str) -> Result<Vec<FeedSource>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let sources: Vec<FeedSource> = serde_yaml::from_str(&text)?;
    Ok(sources)
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

static CDATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

/// Feeds routinely embed bare HTML entities that are not legal XML; replace
/// the usual suspects before handing the document to the parser.
fn scrub_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
}

fn unwrap_cdata(s: &str) -> String {
    CDATA_RE.replace_all(s, "$1").into_owned()
}

/// Parse an RSS document into raw records, attaching the feed's configured
/// category label when it has one.
pub fn parse_feed(xml: &str, category: Option<&str>) -> Result<Vec<RawRecord>, FeedError> {
    let cleaned = scrub_for_xml(xml);
    let rss: Rss =
        quick_xml::de::from_str(&cleaned).map_err(|e| FeedError::Malformed(e.to_string()))?;

    if rss.channel.items.is_empty() {
        return Err(FeedError::Empty);
    }

    let records = rss
        .channel
        .items
        .into_iter()
        .map(|item| item_to_record(item, category))
        .collect();
    Ok(records)
}

/// Re-shape one RSS item into the common raw-record form the normalizer
/// consumes. Absent fields stay absent; they must not degrade into `""`.
fn item_to_record(item: Item, category: Option<&str>) -> RawRecord {
    let mut record = serde_json::Map::new();
    if let Some(title) = item.title {
        record.insert("title".to_string(), unwrap_cdata(&title).into());
    }
    if let Some(link) = item.link {
        record.insert("link".to_string(), link.trim().to_string().into());
    }
    if let Some(pub_date) = item.pub_date {
        record.insert("published".to_string(), pub_date.into());
    }
    if let Some(description) = item.description {
        record.insert("summary".to_string(), unwrap_cdata(&description).into());
    }
    if let Some(category) = category {
        record.insert("category".to_string(), category.to_string().into());
    }
    serde_json::Value::Object(record)
}

/// Fetch one feed and return up to `limit` raw records in feed order.
#[instrument(level = "info", skip_all, fields(feed = %source.name))]
pub async fn fetch_feed(
    client: &reqwest::Client,
    source: &FeedSource,
    limit: usize,
) -> Result<Vec<RawRecord>, FeedError> {
    let response = client
        .get(&source.url)
        .timeout(FEED_TIMEOUT)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| FeedError::Unreachable(e.to_string()))?;

    let body = response
        .text()
        .await
        .map_err(|e| FeedError::Unreachable(e.to_string()))?;

    let mut records = parse_feed(&body, source.category.as_deref())?;
    records.truncate(limit);
    debug!(count = records.len(), "Fetched feed records");
    Ok(records)
}
