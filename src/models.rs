//! Data models for aggregated news articles and run accounting.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawRecord`]: the unprocessed, source-shaped record before normalization
//! - [`Article`]: the canonical normalized output entity
//! - [`RunSummary`]: per-run accounting returned by the pipeline
//!
//! The wire format uses camelCase field names (the shape the upstream API
//! speaks), mapped from snake_case Rust fields with `serde(rename_all)`.
//!
//! # Unavailable vs. empty
//!
//! The classification fields (`category`, `country`, `language`) and `id` are
//! `Option<String>` and are *always* serialized: JSON `null` is the explicit
//! "source does not support this field" sentinel, distinct from `""` which
//! means the source sent an empty value. The enrichment fields
//! (`full_content`, `content_available`) are instead omitted entirely when
//! enrichment was never attempted, so consumers can tell "not attempted"
//! apart from "attempted and failed".

use serde::{Deserialize, Serialize};

/// The unprocessed record shape as returned by a specific source adapter.
///
/// Both the paginated API (JSON objects straight off the wire) and the feed
/// adapter (RSS items re-shaped into the same map form) produce these; the
/// normalizer consumes them through a per-source field map.
pub type RawRecord = serde_json::Value;

/// A normalized news article, the canonical output entity of a run.
///
/// `link` doubles as the enrichment key and is never empty for a
/// successfully normalized article; records without a resolvable link are
/// dropped by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Opaque source-provided identifier; `None` for feed sources.
    #[serde(default)]
    pub id: Option<String>,
    /// The article headline.
    pub title: String,
    /// Canonical URL of the article. Never empty.
    pub link: String,
    /// Publication timestamp as reported by the source, verbatim.
    pub published_at: String,
    /// Short excerpt from the source's summary/description, truncated.
    pub summary: String,
    /// Provenance label: the source id or configured feed name.
    pub source: String,
    /// Classification fields; `None` means the source does not supply them.
    pub category: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    /// Full text from enrichment. Present only after a successful scrape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    /// Set only when enrichment was attempted for this article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_available: Option<bool>,
}

impl Article {
    /// Extract the host of the article link for logging,
    /// e.g. `https://lite.cnn.com/x` -> `lite.cnn.com`.
    pub fn link_host(&self) -> Option<String> {
        crate::utils::host_of(&self.link)
    }
}

/// Accounting for a single pipeline run.
///
/// The run boundary never reports a bare success/failure flag; it reports
/// these counters, and partial results are always persisted.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    /// Raw records obtained from all sources before normalization.
    pub fetched: usize,
    /// Records dropped by the normalizer for lacking a resolvable link.
    pub dropped: usize,
    /// Articles whose full text was successfully extracted.
    pub enriched: usize,
    /// Articles for which enrichment was attempted (success or not).
    pub enrichment_attempts: usize,
    /// Sources that failed outright (unreachable, malformed, empty).
    pub source_errors: usize,
    /// Quota units consumed against the paginated source.
    pub quota_used: u32,
    /// The configured quota ceiling.
    pub quota_limit: u32,
    /// Whether pagination stopped because the quota ran out.
    pub quota_exhausted: bool,
    /// Articles written to the output artifact.
    pub written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article {
            id: Some("ad6f2c180b".to_string()),
            title: "Test Article".to_string(),
            link: "https://example.com/story".to_string(),
            published_at: "2025-11-03 08:12:44".to_string(),
            summary: "Short summary".to_string(),
            source: "example-wire".to_string(),
            category: Some("technology".to_string()),
            country: None,
            language: Some("en".to_string()),
            full_content: None,
            content_available: None,
        }
    }

    #[test]
    fn test_unavailable_fields_serialize_as_null() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"country\":null"));
        // Unsupported fields must not collapse into empty strings.
        assert!(!json.contains("\"country\":\"\""));
    }

    #[test]
    fn test_enrichment_fields_omitted_when_not_attempted() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("fullContent"));
        assert!(!json.contains("contentAvailable"));
    }

    #[test]
    fn test_enrichment_fields_present_after_attempt() {
        let mut article = sample();
        article.content_available = Some(false);
        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("\"contentAvailable\":false"));
        assert!(!json.contains("fullContent"));

        article.full_content = Some("Body text".to_string());
        article.content_available = Some(true);
        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("\"fullContent\":\"Body text\""));
        assert!(json.contains("\"contentAvailable\":true"));
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"publishedAt\""));
        assert!(!json.contains("published_at"));
    }

    #[test]
    fn test_article_round_trip() {
        let mut article = sample();
        article.country = Some(String::new());
        let json = serde_json::to_string(&article).unwrap();
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back, article);
        // Empty-but-present survives the trip distinctly from null.
        assert_eq!(back.country.as_deref(), Some(""));
        assert_eq!(back.full_content, None);
    }

    #[test]
    fn test_link_host() {
        assert_eq!(sample().link_host().as_deref(), Some("example.com"));
    }
}
