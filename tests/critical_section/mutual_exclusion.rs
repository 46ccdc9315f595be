//! Mutual Exclusion Tests
//!
//! N threads each add 1 to the same padded counter M times; the final value
//! must be N * M whichever path each invocation took.

use crate::*;
use elision::{OverlapMode, RawStatus, Unsupported};
use rand::Rng;

const THREADS: usize = 4;
const PER_THREAD: usize = 500;

fn assert_no_lost_updates(counter: &CacheAligned<AtomicU64>) {
    assert_eq!(
        counter.load(Ordering::Relaxed),
        (THREADS * PER_THREAD) as u64,
        "lost updates"
    );
}

/// Simulated transactions with random injected conflicts mix both paths
#[test]
fn test_simulated_mixed_paths_lose_no_updates() {
    let htm = SimulatedHtm::with_injector(|_| {
        rand::thread_rng()
            .gen_bool(0.4)
            .then_some(RawStatus::conflict())
    });
    let executor = Arc::new(
        ExecutorBuilder::new()
            .initial_budget(3)
            .statistics(true)
            .build(htm)
            .unwrap(),
    );
    let counter = Arc::new(CacheAligned::new(AtomicU64::new(0)));

    let results = hammer(&executor, &counter, THREADS, PER_THREAD);

    assert_no_lost_updates(&counter);
    let total: AbortStats = results.iter().filter_map(|(_, s)| s.as_ref()).sum();
    assert_eq!(total.invocations(), (THREADS * PER_THREAD) as u64);
    assert_eq!(total.escapes, 0);
    assert!(results
        .iter()
        .flat_map(|(outcomes, _)| outcomes)
        .all(|outcome| outcome.is_committed()));
}

/// Waiting overlap: only injected faults abort, so both paths still mix
#[test]
fn test_simulated_waiting_overlap_loses_no_updates() {
    let htm =
        SimulatedHtm::with_injector(|attempt| (attempt % 7 == 0).then_some(RawStatus::capacity()))
            .overlap(OverlapMode::Wait);
    let executor = Arc::new(
        ExecutorBuilder::new()
            .retry_policy(RetryPolicy::ReasonAware)
            .build(htm)
            .unwrap(),
    );
    let counter = Arc::new(CacheAligned::new(AtomicU64::new(0)));

    let results = hammer(&executor, &counter, THREADS, PER_THREAD);

    assert_no_lost_updates(&counter);
    let fallbacks = results
        .iter()
        .flat_map(|(outcomes, _)| outcomes)
        .filter(|outcome| outcome.used_fallback())
        .count();
    assert!(fallbacks > 0);
}

/// Without HTM every invocation serializes on the fallback lock
#[test]
fn test_unsupported_serializes_on_lock() {
    let executor = Arc::new(
        ExecutorBuilder::new()
            .initial_budget(2)
            .statistics(true)
            .build(Unsupported)
            .unwrap(),
    );
    let counter = Arc::new(CacheAligned::new(AtomicU64::new(0)));

    let results = hammer(&executor, &counter, THREADS, PER_THREAD);

    assert_no_lost_updates(&counter);
    for (outcomes, stats) in &results {
        assert!(outcomes.iter().all(ExecutionOutcome::used_fallback));
        let stats = stats.unwrap();
        assert_eq!(stats.fallbacks, PER_THREAD as u64);
        assert_eq!(stats.total_aborts(), 2 * PER_THREAD as u64);
    }
}

/// Real transactions when the CPU has RTM, the lock otherwise
#[test]
fn test_hardware_loses_no_updates() {
    let executor = Arc::new(ExecutorBuilder::new().statistics(true).build_hardware().unwrap());
    let counter = Arc::new(CacheAligned::new(AtomicU64::new(0)));

    let results = hammer(&executor, &counter, THREADS, PER_THREAD);

    assert_no_lost_updates(&counter);
    let total: AbortStats = results.iter().filter_map(|(_, s)| s.as_ref()).sum();
    assert_eq!(total.commits + total.fallbacks, (THREADS * PER_THREAD) as u64);
    if !executor.htm().is_transactional() {
        assert_eq!(total.commits, 0);
    }
}
