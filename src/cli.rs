//! Command-line interface and startup configuration validation.
//!
//! All knobs of a run arrive here as immutable configuration: credentials,
//! the quota ceiling, the requested record count, filters, pacing delays,
//! and output paths. There is no runtime reconfiguration; a pipeline either
//! starts fully configured or not at all, so validation failures are fatal
//! before any source is touched.

use clap::Parser;
use thiserror::Error;

/// Command-line arguments for newsgather.
///
/// # Examples
///
/// ```sh
/// # Metadata only, built-in feeds plus the API
/// newsgather -n 25 --query "artificial intelligence" --category technology
///
/// # Feeds only, with full-text scraping and a digest
/// newsgather --skip-api --enrich --digest digest.md
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path for the JSON article artifact
    #[arg(short, long, default_value = "articles.json")]
    pub output: String,

    /// Optional path for a Markdown digest of the run
    #[arg(long)]
    pub digest: Option<String>,

    /// NewsData API key
    #[arg(long, env = "NEWSDATA_API_KEY")]
    pub api_key: Option<String>,

    /// Number of records to request from the paginated API
    #[arg(short = 'n', long, default_value_t = 20)]
    pub count: usize,

    /// Daily request-quota ceiling for the paginated API
    #[arg(long, default_value_t = 200)]
    pub quota_limit: u32,

    /// Free-text search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Category filter (e.g. technology, business)
    #[arg(long)]
    pub category: Option<String>,

    /// Country code filter (e.g. us, gb)
    #[arg(long)]
    pub country: Option<String>,

    /// Language code for API results
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Minimum delay between consecutive paginated API calls, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub page_delay_ms: u64,

    /// Minimum delay between consecutive scrape requests, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub scrape_delay_ms: u64,

    /// Upper bound on scraped full-text length, in characters
    #[arg(long, default_value_t = 2000)]
    pub content_cap: usize,

    /// Scrape full article text from each normalized link
    #[arg(long)]
    pub enrich: bool,

    /// Records to take from each feed
    #[arg(long, default_value_t = 3)]
    pub per_feed_limit: usize,

    /// YAML file replacing the built-in feed list
    #[arg(long)]
    pub sources: Option<String>,

    /// Skip the paginated API source
    #[arg(long)]
    pub skip_api: bool,

    /// Skip all feed sources
    #[arg(long)]
    pub skip_feeds: bool,
}

/// Startup-time configuration problems. Fatal: the pipeline never starts
/// partially configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found; set NEWSDATA_API_KEY or pass --api-key (or use --skip-api)")]
    MissingApiKey,
    #[error("quota limit must be greater than zero")]
    ZeroQuota,
    #[error("nothing to do: both the API source and feeds are disabled")]
    NoSources,
}

impl Cli {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.skip_api && self.skip_feeds {
            return Err(ConfigError::NoSources);
        }
        if !self.skip_api {
            if self.api_key.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingApiKey);
            }
            if self.quota_limit == 0 {
                return Err(ConfigError::ZeroQuota);
            }
        }
        Ok(())
    }
}
