//! Raw abort status words
//!
//! The layout follows the x86 RTM abort status delivered in `EAX` when a
//! transaction aborts:
//!
//! ```text
//! bit  0      explicit abort (XABORT)
//! bit  1      retry hint
//! bit  2      data conflict
//! bit  3      capacity overflow
//! bit  4      debug breakpoint
//! bit  5      abort inside a nested transaction
//! bits 24-31  XABORT imm8 code (valid only with bit 0)
//! ```
//!
//! Software adapters produce words in the same layout so the classifier has a
//! single input format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw status word reported by an aborted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStatus(u32);

impl RawStatus {
    /// Explicit abort requested by `abort(code)`
    pub const EXPLICIT: u32 = 1 << 0;
    /// Hardware suggests the transaction may succeed on retry
    pub const RETRY: u32 = 1 << 1;
    /// Another agent touched a location in the read or write set
    pub const CONFLICT: u32 = 1 << 2;
    /// Transactional footprint overflowed the tracking buffers
    pub const CAPACITY: u32 = 1 << 3;
    /// Debug breakpoint hit inside the transaction
    pub const DEBUG: u32 = 1 << 4;
    /// Abort happened inside a nested transaction
    pub const NESTED: u32 = 1 << 5;
    /// Value left in `EAX` when `begin` actually started a transaction
    pub const STARTED: u32 = u32::MAX;

    const CODE_SHIFT: u32 = 24;

    /// Status with no bits set (unclassified abort)
    pub const NONE: RawStatus = RawStatus(0);

    /// Wrap a raw status word
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        RawStatus(bits)
    }

    /// Status of an explicit abort carrying `code`
    #[inline]
    pub const fn explicit(code: u8) -> Self {
        RawStatus(Self::EXPLICIT | ((code as u32) << Self::CODE_SHIFT))
    }

    /// Status of a transient data conflict, as hardware reports it
    #[inline]
    pub const fn conflict() -> Self {
        RawStatus(Self::CONFLICT | Self::RETRY)
    }

    /// Status of a capacity overflow
    #[inline]
    pub const fn capacity() -> Self {
        RawStatus(Self::CAPACITY)
    }

    /// The raw word
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether all bits of `mask` are set
    #[inline]
    pub const fn contains(self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    /// Explicit abort bit
    #[inline]
    pub const fn is_explicit(self) -> bool {
        self.contains(Self::EXPLICIT)
    }

    /// Retry hint bit
    #[inline]
    pub const fn retry_hint(self) -> bool {
        self.contains(Self::RETRY)
    }

    /// Conflict bit
    #[inline]
    pub const fn is_conflict(self) -> bool {
        self.contains(Self::CONFLICT)
    }

    /// Capacity bit
    #[inline]
    pub const fn is_capacity(self) -> bool {
        self.contains(Self::CAPACITY)
    }

    /// Code passed to `abort`; meaningless unless [`is_explicit`](Self::is_explicit)
    #[inline]
    pub const fn code(self) -> u8 {
        (self.0 >> Self::CODE_SHIFT) as u8
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Result of trying to enter a hardware transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginResult {
    /// The calling thread is now inside a transaction
    Started,
    /// The transaction did not start, or started and was rolled back
    Aborted(RawStatus),
}

impl BeginResult {
    /// Decode the word returned by `XBEGIN`
    #[inline]
    pub const fn from_xbegin(eax: u32) -> Self {
        if eax == RawStatus::STARTED {
            BeginResult::Started
        } else {
            BeginResult::Aborted(RawStatus(eax))
        }
    }

    /// Whether a transaction is now active
    #[inline]
    pub const fn is_started(&self) -> bool {
        matches!(self, BeginResult::Started)
    }
}
