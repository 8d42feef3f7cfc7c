//! Pagination driver for quota-limited sources.
//!
//! [`Pager`] accumulates a target number of records from any [`FetchPage`]
//! implementation, issuing the minimum number of calls and stopping early on
//! quota exhaustion or a terminal adapter failure. All terminal states are
//! non-error: the pager always returns its best partial result as a
//! [`PageRun`], never an `Err`.
//!
//! # Pacing
//!
//! A minimum delay (plus 0-250ms of jitter) is awaited before every call
//! after the first. This is an etiquette mechanism the upstream source
//! effectively requires: skipping it risks throttling or blocking, so the
//! delay is treated as a correctness property rather than a performance knob.
//! The wait suspends the task; it never spins.
//!
//! # Quota
//!
//! One unit is reserved from the shared [`QuotaTracker`] *before* each call,
//! so every issued request counts against the daily ceiling, including
//! successful responses that return zero records. A page can be empty
//! without the source being broken; pagination gives up only after
//! [`MAX_CONSECUTIVE_EMPTY_PAGES`] empty successes in a row.

use crate::models::RawRecord;
use crate::quota::QuotaTracker;
use crate::sources::{FetchPage, PageStatus};
use rand::{Rng, rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Empty successful pages tolerated before pagination stops. One empty page
/// can be a paging artifact; two in a row means the source is drained.
pub const MAX_CONSECUTIVE_EMPTY_PAGES: u32 = 2;

/// Result of driving a paginated source toward a target count.
///
/// `records` holds at most the requested count, in source-reported order.
#[derive(Debug, Default)]
pub struct PageRun {
    pub records: Vec<RawRecord>,
    /// Requests actually issued (and therefore quota units consumed).
    pub calls: u32,
    /// Pagination stopped because `try_reserve` was refused.
    pub quota_exhausted: bool,
    /// Terminal adapter failure, if one ended the run.
    pub failed: Option<String>,
}

/// Drives repeated paginated calls against one source.
pub struct Pager<'a, F> {
    fetcher: &'a F,
    quota: &'a QuotaTracker,
    page_delay: Duration,
}

impl<'a, F> Pager<'a, F>
where
    F: FetchPage,
{
    pub fn new(fetcher: &'a F, quota: &'a QuotaTracker, page_delay: Duration) -> Self {
        Self {
            fetcher,
            quota,
            page_delay,
        }
    }

    /// Collect up to `target_count` records at `page_size` records per call.
    ///
    /// Stops when the target is reached, the quota is exhausted, the adapter
    /// signals a terminal failure, or the source keeps answering with empty
    /// pages. Never returns more than `target_count` records, even when the
    /// final page overshoots.
    #[instrument(level = "info", skip_all, fields(target_count = target_count, page_size = page_size))]
    pub async fn collect(&self, target_count: usize, page_size: u32) -> PageRun {
        let mut run = PageRun::default();
        let mut consecutive_empty = 0u32;

        while run.records.len() < target_count {
            if !self.quota.try_reserve() {
                warn!(
                    used = self.quota.used(),
                    limit = self.quota.limit(),
                    collected = run.records.len(),
                    "Quota exhausted; stopping pagination"
                );
                run.quota_exhausted = true;
                break;
            }

            if run.calls > 0 {
                let jitter_ms: u64 = rng().random_range(0..=250);
                let delay = self.page_delay + Duration::from_millis(jitter_ms);
                debug!(?delay, "Pacing before next page");
                sleep(delay).await;
            }

            run.calls += 1;
            match self.fetcher.fetch_page(page_size).await {
                PageStatus::Success(page) => {
                    if page.is_empty() {
                        consecutive_empty += 1;
                        debug!(
                            call = run.calls,
                            consecutive_empty, "Source returned an empty page"
                        );
                        if consecutive_empty >= MAX_CONSECUTIVE_EMPTY_PAGES {
                            info!(
                                calls = run.calls,
                                collected = run.records.len(),
                                "Source drained; stopping pagination"
                            );
                            break;
                        }
                    } else {
                        consecutive_empty = 0;
                        debug!(call = run.calls, got = page.len(), "Fetched page");
                        run.records.extend(page);
                    }
                }
                PageStatus::QuotaRejected => {
                    warn!(call = run.calls, "Adapter reported quota rejection");
                    run.quota_exhausted = true;
                    break;
                }
                PageStatus::Failed(reason) => {
                    warn!(call = run.calls, %reason, "Page fetch failed; stopping pagination");
                    run.failed = Some(reason);
                    break;
                }
            }
        }

        run.records.truncate(target_count);
        info!(
            collected = run.records.len(),
            calls = run.calls,
            quota_used = self.quota.used(),
            quota_remaining = self.quota.remaining(),
            "Pagination finished"
        );
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted adapter: pops one prepared outcome per call.
    struct ScriptedSource {
        pages: Mutex<Vec<PageStatus>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<PageStatus>) -> Self {
            Self {
                pages: Mutex::new(pages),
            }
        }
    }

    impl FetchPage for ScriptedSource {
        async fn fetch_page(&self, _page_size: u32) -> PageStatus {
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                PageStatus::Failed("script exhausted".to_string())
            } else {
                pages.remove(0)
            }
        }
    }

    fn full_page(n: usize) -> PageStatus {
        PageStatus::Success((0..n).map(|i| json!({ "title": format!("a{i}") })).collect())
    }

    #[tokio::test]
    async fn test_collects_exact_target_across_pages() {
        let source = ScriptedSource::new(vec![full_page(10), full_page(10), full_page(10)]);
        let quota = QuotaTracker::new(10);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(25, 10).await;
        assert_eq!(run.records.len(), 25);
        assert_eq!(run.calls, 3);
        assert_eq!(quota.used(), 3);
        assert!(!run.quota_exhausted);
        assert!(run.failed.is_none());
    }

    #[tokio::test]
    async fn test_quota_exhaustion_is_partial_result_not_error() {
        // 25 requested at page size 10 with only 2 credits: exactly 20 back.
        let source = ScriptedSource::new(vec![full_page(10), full_page(10), full_page(10)]);
        let quota = QuotaTracker::new(2);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(25, 10).await;
        assert_eq!(run.records.len(), 20);
        assert_eq!(run.calls, 2);
        assert!(run.quota_exhausted);
        assert!(run.failed.is_none());
        assert_eq!(quota.used(), 2);
    }

    #[tokio::test]
    async fn test_failure_stops_pagination_with_partial_result() {
        let source = ScriptedSource::new(vec![
            full_page(10),
            PageStatus::Failed("HTTP 500".to_string()),
            full_page(10),
        ]);
        let quota = QuotaTracker::new(10);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(30, 10).await;
        assert_eq!(run.records.len(), 10);
        assert_eq!(run.failed.as_deref(), Some("HTTP 500"));
        // The failed call still consumed its reservation.
        assert_eq!(quota.used(), 2);
    }

    #[tokio::test]
    async fn test_overshooting_final_page_is_truncated() {
        let source = ScriptedSource::new(vec![full_page(10)]);
        let quota = QuotaTracker::new(10);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(7, 10).await;
        assert_eq!(run.records.len(), 7);
        assert_eq!(run.calls, 1);
    }

    #[tokio::test]
    async fn test_empty_pages_consume_quota_then_stop() {
        let source = ScriptedSource::new(vec![
            full_page(10),
            PageStatus::Success(vec![]),
            PageStatus::Success(vec![]),
            full_page(10),
        ]);
        let quota = QuotaTracker::new(10);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(40, 10).await;
        // Stopped after two consecutive empty successes; all three calls paid.
        assert_eq!(run.records.len(), 10);
        assert_eq!(run.calls, 3);
        assert_eq!(quota.used(), 3);
        assert!(!run.quota_exhausted);
        assert!(run.failed.is_none());
    }

    #[tokio::test]
    async fn test_single_empty_page_does_not_stop() {
        let source = ScriptedSource::new(vec![
            PageStatus::Success(vec![]),
            full_page(10),
        ]);
        let quota = QuotaTracker::new(10);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(10, 10).await;
        assert_eq!(run.records.len(), 10);
        assert_eq!(run.calls, 2);
    }

    #[tokio::test]
    async fn test_adapter_reported_quota_rejection_stops_pagination() {
        let source = ScriptedSource::new(vec![full_page(10), PageStatus::QuotaRejected]);
        let quota = QuotaTracker::new(10);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(30, 10).await;
        assert_eq!(run.records.len(), 10);
        assert!(run.quota_exhausted);
        assert!(run.failed.is_none());
    }

    #[tokio::test]
    async fn test_zero_quota_issues_no_calls() {
        let source = ScriptedSource::new(vec![full_page(10)]);
        let quota = QuotaTracker::new(0);
        let pager = Pager::new(&source, &quota, Duration::ZERO);

        let run = pager.collect(10, 10).await;
        assert!(run.records.is_empty());
        assert_eq!(run.calls, 0);
        assert!(run.quota_exhausted);
    }
}
