//! Per-thread abort statistics
//!
//! Counters are owned by one thread and need no synchronization. Reporting
//! across threads is done by merging snapshots after the workers finish.

use crate::abort::{AbortKind, AbortReason};
use serde::{Deserialize, Serialize};

/// Abort and completion counters of one thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortStats {
    /// Capacity-overflow aborts
    pub capacity: u64,
    /// Conflict aborts
    pub conflict: u64,
    /// Explicit aborts, including lock-busy and escape aborts
    pub explicit: u64,
    /// Unclassified aborts
    pub other: u64,
    /// Invocations committed inside a hardware transaction
    pub commits: u64,
    /// Invocations that ran under the fallback lock
    pub fallbacks: u64,
    /// Invocations ended by the escape code
    pub escapes: u64,
    /// Times a transaction found the fallback lock held and waited for it
    pub lock_waits: u64,
}

impl AbortStats {
    /// Empty counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one abort
    #[inline]
    pub fn record_abort(&mut self, reason: &AbortReason) {
        *self.slot(reason.kind()) += 1;
    }

    /// Aborts of one kind
    pub fn count(&self, kind: AbortKind) -> u64 {
        match kind {
            AbortKind::Capacity => self.capacity,
            AbortKind::Conflict => self.conflict,
            AbortKind::Explicit => self.explicit,
            AbortKind::Other => self.other,
        }
    }

    /// Aborts of every kind
    pub fn total_aborts(&self) -> u64 {
        AbortKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    /// Completed invocations (commits, fallbacks and escapes)
    pub fn invocations(&self) -> u64 {
        self.commits + self.fallbacks + self.escapes
    }

    /// Add another thread's counters into these
    pub fn merge(&mut self, other: &AbortStats) {
        self.capacity += other.capacity;
        self.conflict += other.conflict;
        self.explicit += other.explicit;
        self.other += other.other;
        self.commits += other.commits;
        self.fallbacks += other.fallbacks;
        self.escapes += other.escapes;
        self.lock_waits += other.lock_waits;
    }

    /// One-line human-readable report
    pub fn summary(&self) -> String {
        format!(
            "{} aborts (capacity={}, conflict={}, explicit={}, other={}), \
             {} htm commits, {} fallbacks, {} escapes, {} lock waits",
            self.total_aborts(),
            self.capacity,
            self.conflict,
            self.explicit,
            self.other,
            self.commits,
            self.fallbacks,
            self.escapes,
            self.lock_waits,
        )
    }

    fn slot(&mut self, kind: AbortKind) -> &mut u64 {
        match kind {
            AbortKind::Capacity => &mut self.capacity,
            AbortKind::Conflict => &mut self.conflict,
            AbortKind::Explicit => &mut self.explicit,
            AbortKind::Other => &mut self.other,
        }
    }
}

impl<'a> std::iter::Sum<&'a AbortStats> for AbortStats {
    fn sum<I: Iterator<Item = &'a AbortStats>>(iter: I) -> Self {
        iter.fold(AbortStats::new(), |mut acc, stats| {
            acc.merge(stats);
            acc
        })
    }
}
