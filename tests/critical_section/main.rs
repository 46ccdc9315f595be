//! Critical Section Property Tests
//!
//! Executor-level guarantees, checked against the simulated, unsupported and
//! (when the CPU has RTM) hardware adapters:
//! - No lost updates under contention
//! - Budget accounting and per-invocation reset
//! - Explicit escape without the fallback lock
//! - Fallback lock released exactly once, even on panic
//! - Reference scenarios (two threads, forced conflicts, shared domains)

use elision::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

mod budget;
mod fallback;
mod mutual_exclusion;
mod scenarios;

/// Read-modify-write without an atomic RMW instruction, so only the
/// executor's isolation prevents lost updates
pub fn increment(counter: &AtomicU64) -> BodyResult {
    let value = counter.load(Ordering::Relaxed);
    counter.store(value + 1, Ordering::Relaxed);
    Ok(())
}

/// Run `per_thread` invocations of `increment` on `threads` workers that
/// start together; returns every worker's outcomes and stats
pub fn hammer<H>(
    executor: &Arc<BudgetedExecutor<H>>,
    counter: &Arc<CacheAligned<AtomicU64>>,
    threads: usize,
    per_thread: usize,
) -> Vec<(Vec<ExecutionOutcome>, Option<AbortStats>)>
where
    H: TransactionalMemory + 'static,
{
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|worker| {
            let executor = Arc::clone(executor);
            let counter = Arc::clone(counter);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                let mut ctx = executor.context(worker);
                barrier.wait();

                let outcomes = (0..per_thread)
                    .map(|_| executor.run(&mut ctx, || increment(&counter)).unwrap())
                    .collect();
                (outcomes, ctx.take_stats())
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}
