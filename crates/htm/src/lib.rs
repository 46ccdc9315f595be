//! Transaction intrinsic adapters
//!
//! [`TransactionalMemory`] is the seam between the executor and whatever
//! provides transactional isolation:
//! - [`Rtm`]: Intel RTM (`XBEGIN`/`XEND`/`XABORT`/`XTEST`) on x86_64
//! - [`Unsupported`]: no HTM, every attempt fails immediately
//! - [`HardwareHtm`]: picks one of the two at runtime
//! - [`SimulatedHtm`]: software isolation with fault injection, for tests
//!   and demos on machines without TSX

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hardware;
pub mod sim;
mod unsupported;

#[cfg(target_arch = "x86_64")]
mod rtm;
#[cfg(not(target_arch = "x86_64"))]
#[path = "rtm_unavailable.rs"]
mod rtm;

pub use elision_core::{BeginResult, RawStatus};
pub use hardware::HardwareHtm;
pub use rtm::Rtm;
pub use sim::{OverlapMode, SimulatedHtm};
pub use unsupported::Unsupported;

/// Begin/commit/abort/test primitives of a transactional memory
///
/// All methods return immediately on the calling thread.
///
/// # Contract
///
/// While the calling thread is between a `begin` that returned
/// [`BeginResult::Started`] and the matching `commit`/`abort`, memory accesses
/// it makes must be isolated from every other transaction of the same
/// adapter, and a write by a non-transactional thread to a location read in
/// the transaction must prevent it from committing (or, for software
/// adapters, [`quiesce`](Self::quiesce) must wait it out).
pub trait TransactionalMemory: Send + Sync {
    /// Try to enter a transaction
    fn begin(&self) -> BeginResult;

    /// Commit the active transaction
    ///
    /// Callers must only commit after a successful `begin`; implementations
    /// ignore the call when no transaction is active.
    fn commit(&self);

    /// Abort the active transaction with `code`
    ///
    /// Hardware adapters never return: control resumes at the `begin` that
    /// opened the transaction, which reports the abort status. Software
    /// adapters end the transaction and return the status `begin` would have
    /// reported. Outside a transaction this only returns the explicit status.
    fn abort(&self, code: u8) -> RawStatus;

    /// Whether the calling thread is inside a transaction
    fn is_active(&self) -> bool;

    /// Wait until no transaction started before the caller took the fallback
    /// lock can still commit
    fn quiesce(&self) {}

    /// End the calling thread's transaction after its body panicked
    ///
    /// Hardware needs nothing here: anything that unwinds through a real
    /// transaction aborts it first. Software adapters release their isolation.
    fn unwind(&self) {}

    /// Short adapter name for logs and reports
    fn name(&self) -> &'static str;
}

impl<T: TransactionalMemory + ?Sized> TransactionalMemory for &T {
    #[inline]
    fn begin(&self) -> BeginResult {
        (**self).begin()
    }

    #[inline]
    fn commit(&self) {
        (**self).commit()
    }

    #[inline]
    fn abort(&self, code: u8) -> RawStatus {
        (**self).abort(code)
    }

    #[inline]
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn quiesce(&self) {
        (**self).quiesce()
    }

    fn unwind(&self) {
        (**self).unwind()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: TransactionalMemory + ?Sized> TransactionalMemory for std::sync::Arc<T> {
    #[inline]
    fn begin(&self) -> BeginResult {
        (**self).begin()
    }

    #[inline]
    fn commit(&self) {
        (**self).commit()
    }

    #[inline]
    fn abort(&self, code: u8) -> RawStatus {
        (**self).abort(code)
    }

    #[inline]
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn quiesce(&self) {
        (**self).quiesce()
    }

    fn unwind(&self) {
        (**self).unwind()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
