//! The fallback lock
//!
//! One lock per critical-section domain. A thread takes it only after running
//! out of transactional attempts, and every transaction reads it right after
//! `begin`: a held lock aborts the transaction, and acquiring the lock writes
//! the lock word, which aborts every transaction that already read it.

use elision_core::ExecutorError;
use parking_lot::{Mutex, MutexGuard};
use std::hint::spin_loop;
use std::thread;
use std::time::{Duration, Instant};

/// Mutual-exclusion lock of a critical-section domain
///
/// Cache-line aligned: the lock word sits in the read set of every
/// transaction, so sharing its line with written data would abort them all.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct FallbackLock {
    mutex: Mutex<()>,
}

/// Proof of holding the [`FallbackLock`]; releases it on drop
#[must_use = "the fallback lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct FallbackGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl FallbackLock {
    /// Create an unlocked lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some thread holds the lock
    ///
    /// A single relaxed load; safe to call inside a transaction.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.mutex.is_locked()
    }

    /// Acquire the lock, blocking up to `timeout` (forever if `None`)
    pub fn acquire(&self, timeout: Option<Duration>) -> Result<FallbackGuard<'_>, ExecutorError> {
        let guard = match timeout {
            None => self.mutex.lock(),
            Some(timeout) => {
                self.mutex
                    .try_lock_for(timeout)
                    .ok_or_else(|| ExecutorError::LockTimeout {
                        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    })?
            }
        };
        Ok(FallbackGuard { _guard: guard })
    }

    /// Acquire the lock if it is free
    pub fn try_acquire(&self) -> Option<FallbackGuard<'_>> {
        self.mutex.try_lock().map(|guard| FallbackGuard { _guard: guard })
    }

    /// Spin until the lock is free or `deadline` passes
    ///
    /// Returns whether the lock was observed free.
    pub fn wait_until_free(&self, deadline: Option<Instant>) -> bool {
        let mut backoff = Backoff::new();
        while self.is_locked() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return false;
            }
            backoff.snooze();
        }
        true
    }
}

/// Exponential spin, then yield to the scheduler
struct Backoff {
    step: u32,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6;

    fn new() -> Self {
        Backoff { step: 0 }
    }

    fn snooze(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            for _ in 0..(1u32 << self.step) {
                spin_loop();
            }
            self.step += 1;
        } else {
            thread::yield_now();
        }
    }
}
