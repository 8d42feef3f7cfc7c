//! Utility functions for text cleanup, truncation, and file system checks.
//!
//! This module provides helpers used throughout the pipeline:
//! - Char-boundary-safe truncation for summaries and scraped content
//! - HTML tag stripping and entity decoding for feed summaries and scrapes
//! - Blank-line collapsing for extracted article text
//! - URL host extraction for log labels
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Truncate a string to at most `max` characters, on a char boundary.
///
/// Returns the original string unchanged when it already fits. Used to bound
/// summaries and scraped content; the cut is by `char` so multi-byte text
/// never produces an invalid slice.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes, appending the elided byte count.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", truncate_chars(s, max), s.len() - max)
    }
}

/// Replace every HTML/XML tag with a newline.
///
/// Feed summaries and scraped article bodies both arrive with markup mixed
/// in; the newline keeps adjacent block contents from running together, and
/// [`collapse_blank_lines`] tidies the result.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "\n").into_owned()
}

/// Decode the handful of entities that show up in news feeds and pages.
pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
}

/// Collapse runs of blank (or whitespace-only) lines into single newlines
/// and trim the ends.
pub fn collapse_blank_lines(s: &str) -> String {
    BLANK_RUN_RE.replace_all(s, "\n").trim().to_string()
}

/// Flatten markup into readable one-line text: strip tags, decode entities,
/// and normalize all whitespace to single spaces.
pub fn html_to_text(html: &str) -> String {
    decode_entities(&strip_tags(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the host from a URL for log labels,
/// e.g. `https://text.npr.org/article` -> `text.npr.org`.
pub fn host_of(link: &str) -> Option<String> {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a create-and-delete
/// write test so permission problems surface before the run does any work.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
