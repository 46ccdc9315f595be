//! Placeholder for targets without RTM instructions

use crate::TransactionalMemory;
use elision_core::{BeginResult, RawStatus};
use std::convert::Infallible;

/// Restricted Transactional Memory; never available on this target
#[derive(Debug, Clone, Copy)]
pub struct Rtm {
    never: Infallible,
}

impl Rtm {
    /// Always `None` on this target
    pub fn detect() -> Option<Self> {
        None
    }
}

impl TransactionalMemory for Rtm {
    fn begin(&self) -> BeginResult {
        match self.never {}
    }

    fn commit(&self) {
        match self.never {}
    }

    fn abort(&self, _code: u8) -> RawStatus {
        match self.never {}
    }

    fn is_active(&self) -> bool {
        match self.never {}
    }

    fn name(&self) -> &'static str {
        match self.never {}
    }
}
