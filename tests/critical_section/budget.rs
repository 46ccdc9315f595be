//! Budget Tests
//!
//! An invocation makes exactly `initial_budget` transactional attempts before
//! falling back, and the budget is restored for the next invocation.

use crate::*;
use elision::{AbortKind, RawStatus};
use proptest::prelude::*;

fn always_conflicting(budget: u32) -> BudgetedExecutor<SimulatedHtm> {
    ExecutorBuilder::new()
        .initial_budget(budget)
        .statistics(true)
        .build(SimulatedHtm::always_fail(RawStatus::conflict()))
        .unwrap()
}

#[test]
fn test_exactly_budget_attempts_then_fallback() {
    let executor = always_conflicting(5);
    let mut ctx = executor.context(0);

    let outcome = executor.run(&mut ctx, || Ok(())).unwrap();

    assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
    assert_eq!(executor.htm().attempts_on_current_thread(), 5);
    let stats = ctx.stats().unwrap();
    assert_eq!(stats.count(AbortKind::Conflict), 5);
    assert_eq!(stats.fallbacks, 1);
    assert_eq!(stats.commits, 0);
}

#[test]
fn test_budget_resets_between_invocations() {
    let executor = always_conflicting(4);
    let mut ctx = executor.context(0);

    for _ in 0..2 {
        let outcome = executor.run(&mut ctx, || Ok(())).unwrap();
        assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
    }

    assert_eq!(executor.htm().attempts_on_current_thread(), 8);
    assert_eq!(ctx.stats().unwrap().total_aborts(), 8);
    assert_eq!(ctx.stats().unwrap().fallbacks, 2);
}

#[test]
fn test_fallback_in_one_invocation_does_not_affect_the_next() {
    // Attempts 1-3 fail; with budget 3 the first invocation falls back and
    // the second commits on its first attempt.
    let executor = ExecutorBuilder::new()
        .initial_budget(3)
        .statistics(true)
        .build(SimulatedHtm::fail_first(3, RawStatus::conflict()))
        .unwrap();
    let mut ctx = executor.context(0);

    let first = executor.run(&mut ctx, || Ok(())).unwrap();
    let second = executor.run(&mut ctx, || Ok(())).unwrap();

    assert_eq!(first, ExecutionOutcome::CommittedUnderFallbackLock);
    assert_eq!(second, ExecutionOutcome::CommittedTransactionally);
    assert_eq!(ctx.budget(), 3);
}

#[test]
fn test_body_runs_once_per_attempt() {
    let executor = ExecutorBuilder::new()
        .initial_budget(6)
        .build(SimulatedHtm::new())
        .unwrap();
    let mut ctx = executor.context(0);
    let mut calls = 0;

    // Explicit aborts that are not the escape code are ordinary retries.
    let outcome = executor
        .run(&mut ctx, || {
            calls += 1;
            Err(ExplicitAbort(0x33))
        })
        .unwrap();

    assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
    // Six transactional attempts plus the fallback run
    assert_eq!(calls, 7);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_attempts_equal_budget(budget in 0u32..40, invocations in 1usize..4) {
        let executor = always_conflicting(budget);
        let mut ctx = executor.context(0);

        for _ in 0..invocations {
            let outcome = executor.run(&mut ctx, || Ok(())).unwrap();
            prop_assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
        }

        let expected = u64::from(budget) * invocations as u64;
        prop_assert_eq!(executor.htm().attempts_on_current_thread(), expected);
        prop_assert_eq!(ctx.stats().unwrap().total_aborts(), expected);
    }

    #[test]
    fn prop_commit_after_failures_within_budget(budget in 1u32..20, failures in 0u64..20) {
        let executor = ExecutorBuilder::new()
            .initial_budget(budget)
            .statistics(true)
            .build(SimulatedHtm::fail_first(failures, RawStatus::conflict()))
            .unwrap();
        let mut ctx = executor.context(0);

        let outcome = executor.run(&mut ctx, || Ok(())).unwrap();

        if failures < u64::from(budget) {
            prop_assert_eq!(outcome, ExecutionOutcome::CommittedTransactionally);
            prop_assert_eq!(ctx.stats().unwrap().total_aborts(), failures);
        } else {
            prop_assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
            prop_assert_eq!(ctx.stats().unwrap().total_aborts(), u64::from(budget));
        }
    }
}
