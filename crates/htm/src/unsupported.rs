//! Adapter for targets without hardware transactional memory

use crate::TransactionalMemory;
use elision_core::{BeginResult, RawStatus};

/// Transactional memory that never starts a transaction
///
/// Every `begin` fails with an empty status, so the executor spends its budget
/// without side effects and runs the body under the fallback lock. Use a
/// budget of zero to skip the attempts entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl TransactionalMemory for Unsupported {
    #[inline]
    fn begin(&self) -> BeginResult {
        BeginResult::Aborted(RawStatus::NONE)
    }

    #[inline]
    fn commit(&self) {}

    #[inline]
    fn abort(&self, code: u8) -> RawStatus {
        RawStatus::explicit(code)
    }

    #[inline]
    fn is_active(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}
