//! Budgeted executor: hardware transaction first, fallback lock last
//!
//! ## Protocol
//!
//! ```text
//! 1. budget = initial_budget
//! 2. while budget > 0 and the deadline has not passed:
//!      begin()
//!        Started → lock held?  abort(lock_busy_code)
//!                  body Ok     commit, return CommittedTransactionally
//!                  body Err(c) abort(c)
//!        Aborted(status) →
//!          classify, count
//!          escape code       → return AbortedExplicitly
//!          lock_busy_code    → wait for the lock to be free
//!          capacity overflow → budget = 0 (reason-aware policy only)
//!          budget -= 1
//! 3. take the fallback lock, quiesce, run the body, release
//!    return CommittedUnderFallbackLock
//! ```
//!
//! Step 3 never loops back to step 2, so a thread holding the fallback lock
//! never begins a transaction.
//!
//! Nothing is logged between `begin` and `commit`/`abort`; any system call
//! there aborts the hardware transaction.

use crate::context::TransactionContext;
use crate::lock::FallbackLock;
use elision_core::{
    classify, AbortReason, BeginResult, BodyResult, ExecutionOutcome, ExecutorConfig,
    ExecutorError, ExplicitAbort, RetryPolicy,
};
use elision_htm::TransactionalMemory;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, trace, warn};

/// Runs critical sections transactionally, falling back to a shared lock
///
/// One executor (or several sharing one [`FallbackLock`]) serves every thread
/// of a critical-section domain; each thread brings its own
/// [`TransactionContext`].
///
/// # Example
///
/// ```ignore
/// let executor = BudgetedExecutor::new(HardwareHtm::detect(), ExecutorConfig::default())?;
/// let counter = CacheAligned::new(AtomicU64::new(0));
/// let mut ctx = executor.context(0);
///
/// executor.run(&mut ctx, || {
///     let v = counter.load(Ordering::Relaxed);
///     counter.store(v + 1, Ordering::Relaxed);
///     Ok(())
/// })?;
/// ```
#[derive(Debug)]
pub struct BudgetedExecutor<H> {
    htm: H,
    lock: Arc<FallbackLock>,
    config: ExecutorConfig,
}

impl<H: TransactionalMemory> BudgetedExecutor<H> {
    /// Executor with its own fallback lock
    pub fn new(htm: H, config: ExecutorConfig) -> Result<Self, ExecutorError> {
        Self::with_lock(htm, Arc::new(FallbackLock::new()), config)
    }

    /// Executor joining the domain guarded by `lock`
    ///
    /// Executors with different configurations may share one lock; they then
    /// protect the same data.
    pub fn with_lock(
        htm: H,
        lock: Arc<FallbackLock>,
        config: ExecutorConfig,
    ) -> Result<Self, ExecutorError> {
        config.validate()?;
        Ok(BudgetedExecutor { htm, lock, config })
    }

    /// Active configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// The domain's fallback lock
    pub fn lock(&self) -> &Arc<FallbackLock> {
        &self.lock
    }

    /// The transaction adapter
    pub fn htm(&self) -> &H {
        &self.htm
    }

    /// Fresh context for `worker`, with statistics if configured
    pub fn context(&self, worker: usize) -> TransactionContext {
        TransactionContext::new(worker, self.config.statistics)
    }

    /// Whether the calling thread is inside a transaction
    ///
    /// A body can use this to tell the optimistic path from the fallback path.
    pub fn in_transaction(&self) -> bool {
        self.htm.is_active()
    }

    /// Run `body` once, transactionally if possible
    ///
    /// `body` may be invoked several times (each failed transactional attempt
    /// is rolled back) but its effects become visible exactly once, unless it
    /// returns the escape code. Errors only when the fallback lock cannot be
    /// acquired within the configured timeout.
    pub fn run<F>(
        &self,
        ctx: &mut TransactionContext,
        mut body: F,
    ) -> Result<ExecutionOutcome, ExecutorError>
    where
        F: FnMut() -> BodyResult,
    {
        ctx.reset_budget(self.config.initial_budget);
        let deadline = self
            .config
            .deadline_duration()
            .map(|deadline| Instant::now() + deadline);

        while ctx.has_budget() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!(
                    worker = ctx.worker(),
                    remaining = ctx.budget(),
                    "deadline passed, taking fallback lock"
                );
                return self.run_fallback(ctx, &mut body);
            }

            let status = match self.htm.begin() {
                BeginResult::Started => {
                    // Puts the lock word in the read set.
                    if self.lock.is_locked() {
                        self.htm.abort(self.config.lock_busy_code)
                    } else {
                        let unwind = UnwindGuard { htm: &self.htm };
                        let result = body();
                        unwind.disarm();
                        match result {
                            Ok(()) => {
                                self.htm.commit();
                                ctx.record_commit();
                                return Ok(ExecutionOutcome::CommittedTransactionally);
                            }
                            Err(ExplicitAbort(code)) => self.htm.abort(code),
                        }
                    }
                }
                BeginResult::Aborted(status) => status,
            };

            let reason = classify(status);
            ctx.record_abort(&reason);
            trace!(
                worker = ctx.worker(),
                %reason,
                remaining = ctx.budget(),
                "transaction aborted"
            );

            match reason {
                AbortReason::ExplicitAbort(code) if self.config.escape_code == Some(code) => {
                    ctx.record_escape();
                    return Ok(ExecutionOutcome::AbortedExplicitly(code));
                }
                // A body may return this code too; only a held lock is a wait.
                AbortReason::ExplicitAbort(code)
                    if code == self.config.lock_busy_code && self.lock.is_locked() =>
                {
                    ctx.record_lock_wait();
                    self.lock.wait_until_free(deadline);
                }
                AbortReason::CapacityOverflow
                    if self.config.retry_policy == RetryPolicy::ReasonAware =>
                {
                    ctx.exhaust_budget();
                }
                _ => {}
            }
            ctx.consume_budget();
        }

        debug!(worker = ctx.worker(), "budget exhausted, taking fallback lock");
        self.run_fallback(ctx, &mut body)
    }

    fn run_fallback<F>(
        &self,
        ctx: &mut TransactionContext,
        body: &mut F,
    ) -> Result<ExecutionOutcome, ExecutorError>
    where
        F: FnMut() -> BodyResult,
    {
        debug_assert!(
            !self.htm.is_active(),
            "fallback lock requested from inside a transaction"
        );

        let guard = self
            .lock
            .acquire(self.config.lock_timeout_duration())
            .inspect_err(|e| error!(worker = ctx.worker(), error = %e, "fallback lock unavailable"))?;
        self.htm.quiesce();
        let result = body();
        drop(guard);

        match result {
            Err(ExplicitAbort(code)) if self.config.escape_code == Some(code) => {
                warn!(
                    worker = ctx.worker(),
                    code,
                    "escape code signaled under the fallback lock; writes were not rolled back"
                );
                ctx.record_escape();
                Ok(ExecutionOutcome::AbortedExplicitly(code))
            }
            _ => {
                ctx.record_fallback();
                Ok(ExecutionOutcome::CommittedUnderFallbackLock)
            }
        }
    }
}

/// Ends the calling thread's transaction if the body unwinds out of it
struct UnwindGuard<'a, H: TransactionalMemory> {
    htm: &'a H,
}

impl<H: TransactionalMemory> UnwindGuard<'_, H> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl<H: TransactionalMemory> Drop for UnwindGuard<'_, H> {
    fn drop(&mut self) {
        self.htm.unwind();
    }
}
