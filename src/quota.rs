//! Daily request-quota tracking for the paginated source.
//!
//! The upstream API bills one credit per request regardless of how many
//! records come back, with a hard daily ceiling. [`QuotaTracker`] is created
//! once per run, passed by reference to every paginated fetch, and discarded
//! at process exit; nothing is persisted across runs.
//!
//! Reservation is check-then-increment in a single atomic transition, so the
//! ceiling holds even if paginated fetches across sources ever run
//! concurrently. Nothing ever decrements `used` within a run.

use std::sync::atomic::{AtomicU32, Ordering};

/// Process-lifetime counter enforcing a hard ceiling on paginated calls.
#[derive(Debug)]
pub struct QuotaTracker {
    used: AtomicU32,
    limit: u32,
}

impl QuotaTracker {
    pub fn new(limit: u32) -> Self {
        Self {
            used: AtomicU32::new(0),
            limit,
        }
    }

    /// Atomically reserve one quota unit.
    ///
    /// Returns `true` and increments `used` when `used < limit`; returns
    /// `false` without mutation otherwise. Callers must reserve *before*
    /// issuing the request, so an issued call always counts, including
    /// successful responses that carry zero records.
    pub fn try_reserve(&self) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.limit).then_some(used + 1)
            })
            .is_ok()
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used())
    }
}
