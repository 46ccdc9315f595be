//! Runtime selection between RTM and no HTM

use crate::{Rtm, TransactionalMemory, Unsupported};
use elision_core::{BeginResult, RawStatus};

/// Best transactional memory the running CPU offers
#[derive(Debug, Clone, Copy)]
pub enum HardwareHtm {
    /// Intel RTM
    Rtm(Rtm),
    /// No usable HTM; everything goes through the fallback lock
    Unsupported(Unsupported),
}

impl HardwareHtm {
    /// Probe the CPU
    pub fn detect() -> Self {
        match Rtm::detect() {
            Some(rtm) => HardwareHtm::Rtm(rtm),
            None => HardwareHtm::Unsupported(Unsupported),
        }
    }

    /// Whether transactions can actually start
    pub fn is_transactional(&self) -> bool {
        matches!(self, HardwareHtm::Rtm(_))
    }
}

impl Default for HardwareHtm {
    fn default() -> Self {
        Self::detect()
    }
}

impl TransactionalMemory for HardwareHtm {
    #[inline(always)]
    fn begin(&self) -> BeginResult {
        match self {
            HardwareHtm::Rtm(rtm) => rtm.begin(),
            HardwareHtm::Unsupported(none) => none.begin(),
        }
    }

    #[inline(always)]
    fn commit(&self) {
        match self {
            HardwareHtm::Rtm(rtm) => rtm.commit(),
            HardwareHtm::Unsupported(none) => none.commit(),
        }
    }

    #[inline(always)]
    fn abort(&self, code: u8) -> RawStatus {
        match self {
            HardwareHtm::Rtm(rtm) => rtm.abort(code),
            HardwareHtm::Unsupported(none) => none.abort(code),
        }
    }

    #[inline(always)]
    fn is_active(&self) -> bool {
        match self {
            HardwareHtm::Rtm(rtm) => rtm.is_active(),
            HardwareHtm::Unsupported(none) => none.is_active(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HardwareHtm::Rtm(rtm) => rtm.name(),
            HardwareHtm::Unsupported(none) => none.name(),
        }
    }
}
