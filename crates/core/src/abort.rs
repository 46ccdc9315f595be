//! Abort classification
//!
//! Maps a [`RawStatus`] into the closed set of reasons the executor reasons
//! about. Precedence when several bits are set:
//!
//! 1. capacity overflow (retrying the same footprint will overflow again)
//! 2. data conflict (transient, worth retrying)
//! 3. explicit abort, decoding the 8-bit code
//! 4. anything else, kept verbatim

use crate::status::RawStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a transaction attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortReason {
    /// Read or write set exceeded hardware tracking capacity
    CapacityOverflow,
    /// Another thread touched the transaction's footprint
    Conflict,
    /// The transaction called `abort(code)`
    ExplicitAbort(u8),
    /// Unclassified abort (interrupt, debug, unsupported instruction, ...)
    Other(RawStatus),
}

impl AbortReason {
    /// Payload-free discriminant, used to index counters
    pub fn kind(&self) -> AbortKind {
        match self {
            AbortReason::CapacityOverflow => AbortKind::Capacity,
            AbortReason::Conflict => AbortKind::Conflict,
            AbortReason::ExplicitAbort(_) => AbortKind::Explicit,
            AbortReason::Other(_) => AbortKind::Other,
        }
    }

    /// Whether retrying the same transaction can plausibly succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, AbortReason::CapacityOverflow)
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::CapacityOverflow => write!(f, "capacity overflow"),
            AbortReason::Conflict => write!(f, "conflict"),
            AbortReason::ExplicitAbort(code) => write!(f, "explicit abort ({:#04x})", code),
            AbortReason::Other(status) => write!(f, "other (status={})", status),
        }
    }
}

/// Abort reason without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortKind {
    /// See [`AbortReason::CapacityOverflow`]
    Capacity,
    /// See [`AbortReason::Conflict`]
    Conflict,
    /// See [`AbortReason::ExplicitAbort`]
    Explicit,
    /// See [`AbortReason::Other`]
    Other,
}

impl AbortKind {
    /// All kinds, in classifier precedence order
    pub const ALL: [AbortKind; 4] = [
        AbortKind::Capacity,
        AbortKind::Conflict,
        AbortKind::Explicit,
        AbortKind::Other,
    ];

    /// Short lowercase name, used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortKind::Capacity => "capacity",
            AbortKind::Conflict => "conflict",
            AbortKind::Explicit => "explicit",
            AbortKind::Other => "other",
        }
    }
}

/// Classify a raw abort status
#[inline]
pub fn classify(status: RawStatus) -> AbortReason {
    if status.is_capacity() {
        AbortReason::CapacityOverflow
    } else if status.is_conflict() {
        AbortReason::Conflict
    } else if status.is_explicit() {
        AbortReason::ExplicitAbort(status.code())
    } else {
        AbortReason::Other(status)
    }
}
