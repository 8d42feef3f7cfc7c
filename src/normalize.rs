//! Normalization of source-shaped records into [`Article`]s.
//!
//! Every source returns a different record shape (the paginated API speaks
//! `article_id`/`pubDate`/`source_id`, feeds speak `title`/`link`/`published`).
//! Rather than per-source normalization code, each shape is described by a
//! [`FieldMap`], a field-name table consumed by one generic [`normalize`].
//!
//! Fields the source does not carry stay `None`, the explicit unavailable
//! sentinel; an empty string is only ever produced when the source itself
//! sent one. Records without a resolvable link are dropped, and the drop
//! count is surfaced so callers can report fetch efficiency.

use crate::models::{Article, RawRecord};
use crate::utils::{html_to_text, truncate_chars};
use tracing::{debug, info};

/// Upper bound on normalized summary length, in chars.
pub const SUMMARY_MAX_CHARS: usize = 160;

/// Field-name mapping from one source's raw shape into the Article schema.
///
/// This is configuration, not logic: adding a source means adding a table.
/// `None` in an optional slot means the source has no such field at all.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub id: Option<&'static str>,
    pub title: &'static str,
    pub link: &'static str,
    pub published: &'static str,
    pub summary: &'static str,
    /// Per-record provenance field; the configured source label is the
    /// fallback when absent.
    pub source: Option<&'static str>,
    pub category: Option<&'static str>,
    pub country: Option<&'static str>,
    pub language: Option<&'static str>,
}

/// Shape of the paginated NewsData-style API records.
pub const NEWSDATA_FIELDS: FieldMap = FieldMap {
    id: Some("article_id"),
    title: "title",
    link: "link",
    published: "pubDate",
    summary: "description",
    source: Some("source_id"),
    category: Some("category"),
    country: Some("country"),
    language: Some("language"),
};

/// Shape of RSS feed records. Classification fields other than the
/// feed-configured category label do not exist in syndication entries.
pub const FEED_FIELDS: FieldMap = FieldMap {
    id: None,
    title: "title",
    link: "link",
    published: "published",
    summary: "summary",
    source: None,
    category: Some("category"),
    country: None,
    language: None,
};

/// Look up a raw field as a string.
///
/// The API returns some classification fields as one-element arrays
/// (`"category": ["technology"]`); those coerce to their first entry.
/// Missing keys and JSON nulls are `None`, the unavailable sentinel.
fn field_str(raw: &RawRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.first().and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Normalize one raw record. `None` means the record was dropped for
/// lacking a resolvable link.
///
/// Normalization is pure: the same record always yields the same article.
pub fn normalize(raw: &RawRecord, map: &FieldMap, source_label: &str) -> Option<Article> {
    let link = field_str(raw, map.link).filter(|l| !l.trim().is_empty())?;

    let title = field_str(raw, map.title)
        .map(|t| html_to_text(&t))
        .unwrap_or_default();
    let summary = field_str(raw, map.summary)
        .map(|s| truncate_chars(&html_to_text(&s), SUMMARY_MAX_CHARS))
        .unwrap_or_default();
    let source = map
        .source
        .and_then(|key| field_str(raw, key))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| source_label.to_string());

    Some(Article {
        id: map.id.and_then(|key| field_str(raw, key)),
        title,
        link,
        published_at: field_str(raw, map.published).unwrap_or_default(),
        summary,
        source,
        category: map.category.and_then(|key| field_str(raw, key)),
        country: map.country.and_then(|key| field_str(raw, key)),
        language: map.language.and_then(|key| field_str(raw, key)),
        full_content: None,
        content_available: None,
    })
}

/// Normalize a batch, preserving order, returning the articles and the
/// number of records dropped for lacking a link.
pub fn normalize_all(
    records: &[RawRecord],
    map: &FieldMap,
    source_label: &str,
) -> (Vec<Article>, usize) {
    let mut articles = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for raw in records {
        match normalize(raw, map, source_label) {
            Some(article) => articles.push(article),
            None => {
                dropped += 1;
                debug!(source = source_label, "Dropped record without a link");
            }
        }
    }

    info!(
        source = source_label,
        normalized = articles.len(),
        dropped,
        "Normalized batch"
    );
    (articles, dropped)
}
