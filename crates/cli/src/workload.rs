//! Shared-counter workload.
//!
//! Every worker increments one cache-aligned counter `iterations` times with
//! a plain load and store, so only the executor keeps updates from being
//! lost.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use elision::{
    AbortStats, BudgetedExecutor, CacheAligned, ExecutionOutcome, ExplicitAbort,
    TransactionalMemory,
};
use serde::Serialize;

use crate::parse::Workload;

/// How each critical section ended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub transactional: u64,
    pub fallback: u64,
    pub escaped: u64,
}

impl OutcomeTally {
    fn record(&mut self, outcome: ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::CommittedTransactionally => self.transactional += 1,
            ExecutionOutcome::CommittedUnderFallbackLock => self.fallback += 1,
            ExecutionOutcome::AbortedExplicitly(_) => self.escaped += 1,
        }
    }

    fn merge(&mut self, other: &OutcomeTally) {
        self.transactional += other.transactional;
        self.fallback += other.fallback;
        self.escaped += other.escaped;
    }

    /// Critical sections whose effects became visible
    pub fn committed(&self) -> u64 {
        self.transactional + self.fallback
    }
}

/// Result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub adapter: &'static str,
    pub threads: usize,
    pub iterations: usize,
    pub counter: u64,
    pub expected: u64,
    pub outcomes: OutcomeTally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AbortStats>,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl Report {
    /// Whether any committed increment went missing
    pub fn lost_updates(&self) -> bool {
        self.counter != self.expected
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Run the workload on `executor`.
pub fn run<H>(executor: BudgetedExecutor<H>, workload: &Workload) -> Result<Report, String>
where
    H: TransactionalMemory + 'static,
{
    let executor = Arc::new(executor);
    let counter = Arc::new(CacheAligned::new(AtomicU64::new(0)));
    let barrier = Arc::new(Barrier::new(workload.threads));
    let escape = executor.config().escape_code;

    let start = Instant::now();
    let handles: Vec<_> = (0..workload.threads)
        .map(|worker| {
            let executor = Arc::clone(&executor);
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            let iterations = workload.iterations;
            let escape_every = workload.escape_every;

            thread::spawn(move || -> Result<_, String> {
                let mut ctx = executor.context(worker);
                let mut tally = OutcomeTally::default();
                barrier.wait();

                for i in 1..=iterations {
                    let escaping = escape_every.is_some_and(|n| i % n == 0);
                    let outcome = executor
                        .run(&mut ctx, || {
                            if let (true, Some(code)) = (escaping, escape) {
                                return Err(ExplicitAbort(code));
                            }
                            let value = counter.load(Ordering::Relaxed);
                            counter.store(value + 1, Ordering::Relaxed);
                            Ok(())
                        })
                        .map_err(|e| format!("worker {}: {}", worker, e))?;
                    tally.record(outcome);
                }

                tracing::debug!(worker, ?tally, "worker finished");
                Ok((tally, ctx.take_stats()))
            })
        })
        .collect();

    let mut outcomes = OutcomeTally::default();
    let mut stats: Option<AbortStats> = None;
    for handle in handles {
        let (tally, worker_stats) = handle
            .join()
            .map_err(|_| "worker thread panicked".to_string())??;
        outcomes.merge(&tally);
        if let Some(worker_stats) = worker_stats {
            stats.get_or_insert_with(AbortStats::default).merge(&worker_stats);
        }
    }
    let elapsed = start.elapsed();

    Ok(Report {
        adapter: executor.htm().name(),
        threads: workload.threads,
        iterations: workload.iterations,
        counter: counter.load(Ordering::Relaxed),
        expected: outcomes.committed(),
        outcomes,
        stats,
        elapsed,
    })
}
