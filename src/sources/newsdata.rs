//! Paginated source adapter for the NewsData-style REST API.
//!
//! The upstream exposes `GET {base}/latest` with query parameters for a
//! free-text query, category, country, language, and page size (capped at 10
//! records per call). Every call costs one credit against the daily quota,
//! no matter how many records come back. Quota reservation is the pager's
//! job, which is why this adapter never produces
//! [`PageStatus::QuotaRejected`] on its own.
//!
//! The free tier only carries metadata (`title`, `description`, `link`,
//! `pubDate`, `source_id`, classification fields); full text comes from the
//! enricher, not from here.

use crate::models::RawRecord;
use crate::sources::{FetchPage, PageStatus};
use crate::utils::truncate_for_log;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const BASE_URL: &str = "https://newsdata.io/api/1";
/// The API rejects `size` above 10 on the free tier.
pub const MAX_PAGE_SIZE: u32 = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Recognized search options. Options the upstream does not support for a
/// given plan are simply not sent; unsupported combinations are the
/// adapter's concern, never the caller's.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub language: String,
}

/// Wire shape of the `/latest` response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawRecord>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl ApiResponse {
    fn failure_message(&self) -> String {
        match &self.message {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => format!("API status {}", self.status),
        }
    }
}

/// HTTP client for the paginated metadata API.
pub struct NewsDataClient {
    http: reqwest::Client,
    api_key: String,
    filters: SearchFilters,
}

impl NewsDataClient {
    pub fn new(api_key: String, filters: SearchFilters) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            filters,
        }
    }

    fn query_params(&self, page_size: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", self.api_key.clone()),
            ("language", self.filters.language.clone()),
        ];
        if let Some(q) = &self.filters.query {
            params.push(("q", q.clone()));
        }
        if let Some(category) = &self.filters.category {
            params.push(("category", category.clone()));
        }
        if let Some(country) = &self.filters.country {
            params.push(("country", country.clone()));
        }
        params.push(("size", page_size.min(MAX_PAGE_SIZE).to_string()));
        params
    }
}

impl FetchPage for NewsDataClient {
    #[instrument(level = "info", skip_all, fields(page_size = page_size))]
    async fn fetch_page(&self, page_size: u32) -> PageStatus {
        let url = format!("{BASE_URL}/latest");
        let response = self
            .http
            .get(&url)
            .query(&self.query_params(page_size))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        let response = match response.and_then(|r| r.error_for_status()) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "API request failed");
                return PageStatus::Failed(e.to_string());
            }
        };

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "API response body could not be read");
                return PageStatus::Failed(e.to_string());
            }
        };

        let payload = match serde_json::from_str::<ApiResponse>(&body) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, body = %truncate_for_log(&body, 300), "API payload did not parse");
                return PageStatus::Failed(format!("malformed payload: {e}"));
            }
        };

        if payload.status == "success" {
            debug!(got = payload.results.len(), "API page fetched");
            PageStatus::Success(payload.results)
        } else {
            let message = payload.failure_message();
            warn!(
                status = %payload.status,
                message = %truncate_for_log(&message, 300),
                "API reported an error"
            );
            PageStatus::Failed(message)
        }
    }
}
