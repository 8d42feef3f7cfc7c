//! # newsgather
//!
//! A news aggregation pipeline that discovers article metadata through a
//! quota-limited REST API and a set of RSS feeds, normalizes everything into
//! one schema, optionally scrapes each article's full text from its link,
//! and writes a single JSON artifact per run.
//!
//! ## Features
//!
//! - Paginated metadata discovery against a NewsData-style API, with a hard
//!   daily request quota enforced client-side and pacing between calls
//! - Best-effort RSS ingestion from a configurable feed list; a broken feed
//!   never fails the run
//! - Generic normalization over per-source field maps, preserving the
//!   difference between "unavailable" and "empty" fields
//! - Optional full-text enrichment by scraping article links, isolated per
//!   article and paced independently of the API
//! - JSON artifact plus an optional Markdown digest
//!
//! ## Usage
//!
//! ```sh
//! newsgather -n 25 -q "artificial intelligence" --category technology --enrich
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: Pager-driven API pagination and concurrent feed pulls
//! 2. **Normalization**: raw records become [`models::Article`]s
//! 3. **Enrichment**: per-article full-text scraping (optional)
//! 4. **Output**: JSON artifact, optional Markdown digest, run summary

use clap::Parser;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod enrich;
mod models;
mod normalize;
mod outputs;
mod pager;
mod quota;
mod sources;
mod utils;

use cli::Cli;
use enrich::{Enricher, HttpContentFetcher};
use models::{Article, RunSummary};
use normalize::{FEED_FIELDS, NEWSDATA_FIELDS, normalize_all};
use pager::Pager;
use quota::QuotaTracker;
use sources::feeds;
use sources::newsdata::{MAX_PAGE_SIZE, NewsDataClient, SearchFilters};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsgather starting up");

    // Parse CLI and fail fast on bad configuration; the pipeline never
    // starts partially configured.
    let args = Cli::parse();
    if let Err(e) = args.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(Box::new(e) as Box<dyn Error>);
    }

    // Resolve the feed list up front so a bad --sources file is also a
    // startup failure, not a mid-run one.
    let feed_sources = if args.skip_feeds {
        Vec::new()
    } else {
        match &args.sources {
            Some(path) => match feeds::load_sources(path) {
                Ok(sources) => {
                    info!(path = %path, count = sources.len(), "Loaded feed list");
                    sources
                }
                Err(e) => {
                    error!(path = %path, error = %e, "Could not load feed list");
                    return Err(e);
                }
            },
            None => feeds::default_sources(),
        }
    };

    // Early check: ensure the artifact location is writable.
    if let Some(parent) = Path::new(&args.output).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = ensure_writable_dir(&parent.to_string_lossy()).await {
                error!(
                    path = %args.output,
                    error = %e,
                    "Output location is not writable (fix perms or choose a different path)"
                );
                return Err(e);
            }
        }
    }

    let quota = QuotaTracker::new(args.quota_limit);
    let mut summary = RunSummary {
        quota_limit: args.quota_limit,
        ..Default::default()
    };
    let mut articles: Vec<Article> = Vec::new();

    // ---- Paginated API source ----
    if !args.skip_api {
        let filters = SearchFilters {
            query: args.query.clone(),
            category: args.category.clone(),
            country: args.country.clone(),
            language: args.language.clone(),
        };
        let api_key = args.api_key.clone().unwrap_or_default();
        let client = NewsDataClient::new(api_key, filters);
        let page_delay = Duration::from_millis(args.page_delay_ms);
        let pager = Pager::new(&client, &quota, page_delay);

        let run = pager.collect(args.count, MAX_PAGE_SIZE).await;
        summary.fetched += run.records.len();
        summary.quota_exhausted = run.quota_exhausted;
        if let Some(reason) = &run.failed {
            summary.source_errors += 1;
            warn!(%reason, "API pagination ended on a failure; keeping partial result");
        }

        let (normalized, dropped) = normalize_all(&run.records, &NEWSDATA_FIELDS, "newsdata");
        summary.dropped += dropped;
        // Consecutive API pages overlap now and then; keep the first sighting
        // of each link. Cross-source de-dup stays out of scope.
        let normalized: Vec<Article> = normalized
            .into_iter()
            .unique_by(|article| article.link.clone())
            .collect();
        info!(
            count = normalized.len(),
            calls = run.calls,
            "API source contributed articles"
        );
        articles.extend(normalized);
    }
    summary.quota_used = quota.used();

    // ---- Feed sources ----
    if !feed_sources.is_empty() {
        let feed_client = reqwest::Client::new();
        let results: Vec<_> = stream::iter(feed_sources.iter())
            .map(|source| {
                let client = &feed_client;
                async move {
                    (
                        source,
                        feeds::fetch_feed(client, source, args.per_feed_limit).await,
                    )
                }
            })
            .buffered(4)
            .collect()
            .await;

        for (source, result) in results {
            match result {
                Ok(records) => {
                    summary.fetched += records.len();
                    let (normalized, dropped) = normalize_all(&records, &FEED_FIELDS, &source.name);
                    summary.dropped += dropped;
                    articles.extend(normalized);
                }
                Err(e) => {
                    summary.source_errors += 1;
                    warn!(
                        feed = %source.name,
                        kind = e.kind(),
                        error = %e,
                        "Feed source failed; continuing with remaining sources"
                    );
                }
            }
        }
    }

    info!(count = articles.len(), "Total articles collected");

    // ---- Enrichment ----
    if args.enrich && !articles.is_empty() {
        let enricher = Enricher::new(
            HttpContentFetcher::new(),
            Duration::from_millis(args.scrape_delay_ms),
            args.content_cap,
        );
        summary.enrichment_attempts = articles.len();
        summary.enriched = enricher.enrich_all(&mut articles).await;
    }

    // ---- Persist ----
    match outputs::json::persist(&articles, &args.output).await {
        Ok(written) => summary.written = written,
        Err(e) => error!(path = %args.output, error = %e, "Failed to write article artifact"),
    }

    if let Some(digest_path) = &args.digest {
        let md = outputs::markdown::render_digest(&articles, &summary);
        if let Err(e) = tokio::fs::write(digest_path, md).await {
            error!(path = %digest_path, error = %e, "Failed writing digest");
        } else {
            info!(path = %digest_path, "Wrote Markdown digest");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        fetched = summary.fetched,
        dropped = summary.dropped,
        enriched = summary.enriched,
        enrichment_attempts = summary.enrichment_attempts,
        source_errors = summary.source_errors,
        quota_used = summary.quota_used,
        quota_limit = summary.quota_limit,
        quota_exhausted = summary.quota_exhausted,
        written = summary.written,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Run complete"
    );

    Ok(())
}
