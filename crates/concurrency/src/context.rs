//! Per-thread transaction context
//!
//! Each worker owns exactly one [`TransactionContext`] and hands it to the
//! executor by `&mut` on every invocation, so the budget and counters are
//! never shared and never synchronized.

use elision_core::{AbortReason, AbortStats};

/// Retry budget and optional statistics of one worker thread
///
/// Aligned to a cache line so contexts of different workers stored side by
/// side do not falsely share.
#[repr(align(64))]
#[derive(Debug, Clone)]
pub struct TransactionContext {
    worker: usize,
    budget: u32,
    stats: Option<AbortStats>,
}

impl TransactionContext {
    /// Context for `worker`, collecting statistics if `statistics` is set
    pub fn new(worker: usize, statistics: bool) -> Self {
        TransactionContext {
            worker,
            budget: 0,
            stats: statistics.then(AbortStats::new),
        }
    }

    /// Worker identity supplied at creation
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Attempts left in the current (or last) invocation
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Counters, when statistics are enabled
    pub fn stats(&self) -> Option<&AbortStats> {
        self.stats.as_ref()
    }

    /// Take the counters, leaving zeroed ones in place
    pub fn take_stats(&mut self) -> Option<AbortStats> {
        self.stats.as_mut().map(std::mem::take)
    }

    pub(crate) fn reset_budget(&mut self, budget: u32) {
        self.budget = budget;
    }

    #[inline]
    pub(crate) fn has_budget(&self) -> bool {
        self.budget > 0
    }

    #[inline]
    pub(crate) fn consume_budget(&mut self) {
        self.budget = self.budget.saturating_sub(1);
    }

    pub(crate) fn exhaust_budget(&mut self) {
        self.budget = 0;
    }

    #[inline]
    pub(crate) fn record_abort(&mut self, reason: &AbortReason) {
        if let Some(stats) = self.stats.as_mut() {
            stats.record_abort(reason);
        }
    }

    pub(crate) fn record_commit(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.commits += 1;
        }
    }

    pub(crate) fn record_fallback(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.fallbacks += 1;
        }
    }

    pub(crate) fn record_escape(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.escapes += 1;
        }
    }

    pub(crate) fn record_lock_wait(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.lock_waits += 1;
        }
    }
}
