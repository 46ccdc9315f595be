//! Software transactional memory simulator
//!
//! [`SimulatedHtm`] gives the executor something to drive on machines
//! without TSX, with deterministic fault injection for tests:
//!
//! - Isolation comes from one internal mutex held from `begin` to
//!   `commit`/`abort`. A `begin` that finds it held fails with a conflict
//!   status (or waits, see [`OverlapMode`]).
//! - Every `begin` on a thread increments that thread's attempt number; the
//!   injector sees it first and may fail the attempt with any status. The
//!   counts live in thread-local storage and die with their thread.
//! - Writes are **not** rolled back. A body that signals an explicit abort
//!   should do so before writing anything.
//! - [`quiesce`](crate::TransactionalMemory::quiesce) waits for the
//!   in-flight transaction, standing in for the hardware abort a lock
//!   acquisition would cause.

use crate::TransactionalMemory;
use elision_core::{BeginResult, RawStatus};
use parking_lot::lock_api::RawMutex as RawMutexApi;
use parking_lot::RawMutex;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Id of the simulator the current thread is inside, 0 if none.
    static ACTIVE: Cell<u64> = const { Cell::new(0) };

    // Simulator id -> (epoch, attempts) for the current thread.
    static ATTEMPTS: RefCell<FxHashMap<u64, (u64, u64)>> =
        RefCell::new(FxHashMap::default());
}

type Injector = Box<dyn Fn(u64) -> Option<RawStatus> + Send + Sync>;

/// What `begin` does when another simulated transaction is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapMode {
    /// Fail with a conflict status, like hardware would
    #[default]
    Conflict,
    /// Block until the other transaction ends; only injected faults abort
    Wait,
}

/// Fault-injecting software stand-in for hardware transactional memory
pub struct SimulatedHtm {
    id: u64,
    isolation: RawMutex,
    overlap: OverlapMode,
    injector: Injector,
    // Bumped by `reset_attempts`; older per-thread counts read as zero.
    epoch: AtomicU64,
    started: AtomicU64,
    committed: AtomicU64,
}

impl SimulatedHtm {
    /// Simulator without injected faults
    pub fn new() -> Self {
        Self::with_injector(|_| None)
    }

    /// Simulator consulting `injector` with the calling thread's attempt
    /// number (starting at 1) on every `begin`
    pub fn with_injector<F>(injector: F) -> Self
    where
        F: Fn(u64) -> Option<RawStatus> + Send + Sync + 'static,
    {
        SimulatedHtm {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            isolation: <RawMutex as RawMutexApi>::INIT,
            overlap: OverlapMode::Conflict,
            injector: Box::new(injector),
            epoch: AtomicU64::new(0),
            started: AtomicU64::new(0),
            committed: AtomicU64::new(0),
        }
    }

    /// Fail the first `n` attempts of every thread with `status`
    pub fn fail_first(n: u64, status: RawStatus) -> Self {
        Self::with_injector(move |attempt| (attempt <= n).then_some(status))
    }

    /// Fail every attempt with `status`
    pub fn always_fail(status: RawStatus) -> Self {
        Self::with_injector(move |_| Some(status))
    }

    /// Choose how overlapping transactions behave
    pub fn overlap(mut self, mode: OverlapMode) -> Self {
        self.overlap = mode;
        self
    }

    /// `begin` calls made so far by the calling thread
    pub fn attempts_on_current_thread(&self) -> u64 {
        let epoch = self.epoch.load(Ordering::Relaxed);
        ATTEMPTS.with(|attempts| match attempts.borrow().get(&self.id) {
            Some(&(seen, count)) if seen == epoch => count,
            _ => 0,
        })
    }

    /// Forget every thread's attempt count
    pub fn reset_attempts(&self) {
        self.epoch.fetch_add(1, Ordering::Relaxed);
    }

    /// Transactions that started, over all threads
    pub fn transactions_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Transactions that committed, over all threads
    pub fn transactions_committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }

    fn next_attempt(&self) -> u64 {
        let epoch = self.epoch.load(Ordering::Relaxed);
        ATTEMPTS.with(|attempts| {
            let mut attempts = attempts.borrow_mut();
            let entry = attempts.entry(self.id).or_insert((epoch, 0));
            if entry.0 != epoch {
                *entry = (epoch, 0);
            }
            entry.1 += 1;
            entry.1
        })
    }

    /// Leave the transaction; returns whether one was active
    fn end(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        ACTIVE.with(|active| active.set(0));
        // SAFETY: this thread acquired `isolation` in `begin` and has not
        // released it since; `is_active` tracks exactly that window.
        unsafe { self.isolation.unlock() };
        true
    }
}

impl Default for SimulatedHtm {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatedHtm {
    fn drop(&mut self) {
        // Other threads' entries go away when those threads exit.
        let _ = ATTEMPTS.try_with(|attempts| attempts.borrow_mut().remove(&self.id));
    }
}

impl fmt::Debug for SimulatedHtm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedHtm")
            .field("overlap", &self.overlap)
            .field("started", &self.transactions_started())
            .field("committed", &self.transactions_committed())
            .finish_non_exhaustive()
    }
}

impl TransactionalMemory for SimulatedHtm {
    fn begin(&self) -> BeginResult {
        let attempt = self.next_attempt();
        if let Some(status) = (self.injector)(attempt) {
            return BeginResult::Aborted(status);
        }
        if self.is_active() {
            return BeginResult::Aborted(RawStatus::from_bits(RawStatus::NESTED));
        }
        match self.overlap {
            OverlapMode::Conflict => {
                if !self.isolation.try_lock() {
                    return BeginResult::Aborted(RawStatus::conflict());
                }
            }
            OverlapMode::Wait => self.isolation.lock(),
        }
        ACTIVE.with(|active| active.set(self.id));
        self.started.fetch_add(1, Ordering::Relaxed);
        BeginResult::Started
    }

    fn commit(&self) {
        if self.end() {
            self.committed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn abort(&self, code: u8) -> RawStatus {
        self.end();
        RawStatus::explicit(code)
    }

    fn is_active(&self) -> bool {
        ACTIVE.with(|active| active.get() == self.id)
    }

    fn quiesce(&self) {
        self.isolation.lock();
        // SAFETY: acquired on the line above.
        unsafe { self.isolation.unlock() };
    }

    fn unwind(&self) {
        self.end();
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
