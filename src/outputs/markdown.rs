//! Markdown digest rendering.
//!
//! Optional, human-readable view of a run: articles grouped under their
//! category with source, timestamp, summary, and link. Articles whose
//! category is unavailable land in an "Uncategorized" section at the end.

use crate::models::{Article, RunSummary};
use chrono::Local;
use itertools::Itertools;
use std::collections::HashMap;

const UNCATEGORIZED: &str = "Uncategorized";

/// Render the digest for one run.
pub fn render_digest(articles: &[Article], summary: &RunSummary) -> String {
    let sources = articles.iter().map(|a| a.source.as_str()).unique().count();

    let mut md = String::new();
    md.push_str(&format!(
        "# News digest — {}\n\n",
        Local::now().date_naive()
    ));
    md.push_str(&format!(
        "_{} articles from {} sources · {} enriched · {} dropped · quota {}/{}_\n",
        articles.len(),
        sources,
        summary.enriched,
        summary.dropped,
        summary.quota_used,
        summary.quota_limit,
    ));

    // Group under category, keeping first-seen category order and pushing
    // the uncategorized bucket to the end.
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&Article>> = HashMap::new();
    for article in articles {
        let category = article
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        if !grouped.contains_key(category) {
            order.push(category);
        }
        grouped.entry(category).or_default().push(article);
    }
    if let Some(pos) = order.iter().position(|c| *c == UNCATEGORIZED) {
        let uncategorized = order.remove(pos);
        order.push(uncategorized);
    }

    for category in order {
        let entries = &grouped[category];
        md.push_str(&format!("\n## {} ({})\n\n", category, entries.len()));
        for article in entries {
            md.push_str(&format!("- **{}** — {}", article.title, article.source));
            if !article.published_at.is_empty() {
                md.push_str(&format!(", {}", article.published_at));
            }
            md.push('\n');
            if !article.summary.is_empty() {
                md.push_str(&format!("  {}\n", article.summary));
            }
            md.push_str(&format!("  <{}>\n", article.link));
        }
    }

    md
}
