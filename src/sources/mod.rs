//! Source adapters for fetching raw article records.
//!
//! Two kinds of source feed the pipeline:
//!
//! | Kind | Module | Quota | Pagination |
//! |------|--------|-------|------------|
//! | Paginated API | [`newsdata`] | 1 credit per call | up to 10 records per page |
//! | Syndication feed | [`feeds`] | none | single pull per feed |
//!
//! Paginated sources implement [`FetchPage`] and are driven by the
//! [`Pager`](crate::pager::Pager), which owns quota reservation and pacing.
//! Feed sources are pull-once and fail soft: a broken feed is logged and the
//! run continues with the remaining sources.

use crate::models::RawRecord;

pub mod feeds;
pub mod newsdata;

/// Outcome of a single paginated fetch.
#[derive(Debug)]
pub enum PageStatus {
    /// The source answered; the page may legitimately be empty.
    Success(Vec<RawRecord>),
    /// The shared quota was already exhausted. Reservation happens on the
    /// caller's side before the request goes out, so a well-behaved adapter
    /// never produces this itself; the variant exists for symmetry with
    /// adapters that learn about quota from the upstream response.
    QuotaRejected,
    /// Transport error or an error payload. Terminal for the current
    /// pagination run; no further pages are attempted.
    Failed(String),
}

/// A paginated source that can be driven page by page.
///
/// One call consumes one quota unit (reserved by the caller) and returns up
/// to `page_size` records. Implementations report failures through
/// [`PageStatus`] instead of raising, so the pager can always return its
/// best partial result.
pub trait FetchPage {
    async fn fetch_page(&self, page_size: u32) -> PageStatus;
}
