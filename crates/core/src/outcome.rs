//! Critical-section results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal returned by a critical-section body to abort the current attempt
///
/// Inside a hardware transaction this rolls back every write the body made.
/// Whether the executor retries or gives up depends on the configured escape
/// code.
///
/// The executor's lock-busy code (`0xFE` unless configured otherwise) is
/// reserved: a body returning it gets an ordinary retry, and hardware reports
/// it exactly like a transaction that found the fallback lock held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExplicitAbort(pub u8);

impl ExplicitAbort {
    /// The 8-bit application code
    pub fn code(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for ExplicitAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "explicit abort {:#04x}", self.0)
    }
}

/// What a critical-section body returns
pub type BodyResult = Result<(), ExplicitAbort>;

/// How one executor invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// The body ran inside a hardware transaction that committed
    CommittedTransactionally,
    /// The body ran while holding the fallback lock
    CommittedUnderFallbackLock,
    /// The body signaled the configured escape code
    AbortedExplicitly(u8),
}

impl ExecutionOutcome {
    /// Whether the body's effects are visible
    pub fn is_committed(&self) -> bool {
        !matches!(self, ExecutionOutcome::AbortedExplicitly(_))
    }

    /// Whether the fallback lock was taken
    pub fn used_fallback(&self) -> bool {
        matches!(self, ExecutionOutcome::CommittedUnderFallbackLock)
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::CommittedTransactionally => write!(f, "committed (htm)"),
            ExecutionOutcome::CommittedUnderFallbackLock => write!(f, "committed (fallback)"),
            ExecutionOutcome::AbortedExplicitly(code) => {
                write!(f, "aborted explicitly ({:#04x})", code)
            }
        }
    }
}
