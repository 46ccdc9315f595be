//! Reference Scenarios
//!
//! End-to-end runs of fixed workloads, including the three classic
//! configurations (retry forever, bounded retry, bounded retry with
//! statistics) expressed as presets of one executor.

use crate::*;
use elision::{AbortKind, OverlapMode, RawStatus};

/// Two threads, budget 10, the first three attempts of each thread conflict.
#[test]
fn test_two_threads_three_forced_conflicts() {
    let htm = SimulatedHtm::fail_first(3, RawStatus::conflict()).overlap(OverlapMode::Wait);
    let executor = Arc::new(
        ExecutorBuilder::new()
            .initial_budget(10)
            .statistics(true)
            .build(htm)
            .unwrap(),
    );
    let counter = Arc::new(CacheAligned::new(AtomicU64::new(0)));

    let results = hammer(&executor, &counter, 2, 1);

    assert_eq!(counter.load(Ordering::Relaxed), 2);
    for (outcomes, stats) in results {
        assert_eq!(outcomes, vec![ExecutionOutcome::CommittedTransactionally]);
        let stats = stats.unwrap();
        assert_eq!(stats.total_aborts(), 3);
        assert_eq!(stats.count(AbortKind::Conflict), 3);
        assert_eq!(stats.commits, 1);
        assert_eq!(stats.fallbacks, 0);
    }
    assert_eq!(executor.htm().transactions_committed(), 2);
}

/// Retry forever: never touches the fallback lock while transactions can
/// eventually start.
#[test]
fn test_retry_only_preset() {
    let executor = ExecutorBuilder::from_config(ExecutorConfig::retry_only())
        .statistics(true)
        .build(SimulatedHtm::fail_first(250, RawStatus::conflict()))
        .unwrap();
    let mut ctx = executor.context(0);

    let outcome = executor.run(&mut ctx, || Ok(())).unwrap();

    assert_eq!(outcome, ExecutionOutcome::CommittedTransactionally);
    assert_eq!(ctx.stats().unwrap().conflict, 250);
    assert_eq!(ctx.stats().unwrap().fallbacks, 0);
}

/// Bounded retry without statistics
#[test]
fn test_bounded_preset() {
    let executor = ExecutorBuilder::from_config(ExecutorConfig::bounded(3))
        .build(SimulatedHtm::always_fail(RawStatus::capacity()))
        .unwrap();
    let mut ctx = executor.context(0);

    let outcome = executor.run(&mut ctx, || Ok(())).unwrap();

    assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
    assert_eq!(executor.htm().attempts_on_current_thread(), 3);
    assert!(ctx.stats().is_none());
}

/// Bounded retry with per-reason counters
#[test]
fn test_with_statistics_preset() {
    let executor = ExecutorBuilder::from_config(ExecutorConfig::with_statistics())
        .build(SimulatedHtm::with_injector(|attempt| match attempt {
            1 => Some(RawStatus::capacity()),
            2 => Some(RawStatus::conflict()),
            3 => Some(RawStatus::explicit(0x42)),
            4 => Some(RawStatus::NONE),
            _ => None,
        }))
        .unwrap();
    let mut ctx = executor.context(0);

    let outcome = executor.run(&mut ctx, || Ok(())).unwrap();

    assert_eq!(outcome, ExecutionOutcome::CommittedTransactionally);
    let stats = ctx.take_stats().unwrap();
    for kind in AbortKind::ALL {
        assert_eq!(stats.count(kind), 1, "{}", kind.as_str());
    }
    assert_eq!(stats.commits, 1);
    assert_eq!(stats.invocations(), 1);
}

/// The same presets written as configuration files
#[test]
fn test_presets_from_toml() {
    let bounded = ExecutorConfig::from_toml_str("initial_budget = 3").unwrap();
    assert_eq!(bounded, ExecutorConfig::bounded(3));

    let stats = ExecutorConfig::from_toml_str("statistics = true").unwrap();
    assert_eq!(stats, ExecutorConfig::with_statistics());

    let escaping = ExecutorConfig::from_toml_str(
        r#"
        initial_budget = 5
        escape_code = 255
        retry_policy = "reason-aware"
        "#,
    )
    .unwrap();
    let executor = ExecutorBuilder::from_config(escaping)
        .build(SimulatedHtm::new())
        .unwrap();
    let mut ctx = executor.context(0);
    let outcome = executor.run(&mut ctx, || Err(ExplicitAbort(0xFF))).unwrap();
    assert_eq!(outcome, ExecutionOutcome::AbortedExplicitly(0xFF));
}
