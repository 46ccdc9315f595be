//! Fallback Lock Tests
//!
//! The fallback lock is held only around the fallback body and released on
//! every exit path, including a panicking body.

use crate::*;
use elision::{Error, RawStatus, Unsupported};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

#[test]
fn test_panicking_fallback_body_releases_lock() {
    let executor = ExecutorBuilder::new()
        .initial_budget(0)
        .statistics(true)
        .build(Unsupported)
        .unwrap();
    let mut ctx = executor.context(0);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        executor.run(&mut ctx, || -> BodyResult { panic!("body failed") })
    }));

    assert!(result.is_err());
    assert!(!executor.lock().is_locked());

    let outcome = executor.run(&mut ctx, || Ok(())).unwrap();
    assert_eq!(outcome, ExecutionOutcome::CommittedUnderFallbackLock);
    assert_eq!(ctx.stats().unwrap().fallbacks, 1);
}

/// A panic inside a transaction ends it, so other threads are not blocked
#[test]
fn test_panicking_transactional_body_ends_transaction() {
    let executor = Arc::new(
        ExecutorBuilder::new()
            .statistics(true)
            .build(SimulatedHtm::new())
            .unwrap(),
    );

    let panicking = Arc::clone(&executor);
    thread::spawn(move || {
        let mut ctx = panicking.context(0);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            panicking.run(&mut ctx, || -> BodyResult { panic!("body failed") })
        }));
        assert!(result.is_err());
        assert!(!panicking.in_transaction());

        // Same thread, next invocation
        let outcome = panicking.run(&mut ctx, || Ok(())).unwrap();
        assert_eq!(outcome, ExecutionOutcome::CommittedTransactionally);
    })
    .join()
    .unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    let other = Arc::clone(&executor);
    thread::spawn(move || {
        let mut ctx = other.context(1);
        let outcome = other.run(&mut ctx, || Ok(())).unwrap();
        tx.send(outcome).unwrap();
    });

    let outcome = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("other thread blocked after a panicking transaction");
    assert_eq!(outcome, ExecutionOutcome::CommittedTransactionally);
    assert!(!executor.lock().is_locked());
    assert_eq!(executor.htm().transactions_committed(), 2);
}

#[test]
fn test_lock_held_only_during_fallback_body() {
    let executor = ExecutorBuilder::new()
        .initial_budget(2)
        .build(SimulatedHtm::always_fail(RawStatus::conflict()))
        .unwrap();
    let mut ctx = executor.context(0);
    let mut held = Vec::new();

    executor
        .run(&mut ctx, || {
            held.push(executor.lock().is_locked());
            Ok(())
        })
        .unwrap();

    // Injected aborts never reach the body, so it ran once, under the lock
    assert_eq!(held, vec![true]);
    assert!(!executor.lock().is_locked());
}

#[test]
fn test_fallback_body_is_not_transactional() {
    let executor = ExecutorBuilder::new()
        .initial_budget(0)
        .build(SimulatedHtm::new())
        .unwrap();
    let mut ctx = executor.context(0);
    let mut transactional = true;

    executor
        .run(&mut ctx, || {
            transactional = executor.in_transaction();
            Ok(())
        })
        .unwrap();

    assert!(!transactional);
    assert_eq!(executor.htm().transactions_started(), 0);
}

#[test]
fn test_lock_timeout_surfaces_as_error() {
    let executor = ExecutorBuilder::new()
        .initial_budget(1)
        .lock_timeout(Duration::from_millis(10))
        .build(Unsupported)
        .unwrap();
    let guard = executor.lock().acquire(None).unwrap();

    let err: Error = thread::scope(|s| {
        s.spawn(|| {
            let mut ctx = executor.context(1);
            executor.run(&mut ctx, || Ok(())).unwrap_err().into()
        })
        .join()
        .unwrap()
    });

    assert!(err.is_timeout());
    assert!(err.to_string().contains("10"));
    drop(guard);

    let mut ctx = executor.context(0);
    assert!(executor.run(&mut ctx, || Ok(())).is_ok());
}

#[test]
fn test_waiters_proceed_in_turn() {
    const THREADS: usize = 3;

    let executor = Arc::new(
        ExecutorBuilder::new()
            .initial_budget(0)
            .build(Unsupported)
            .unwrap(),
    );
    let inside = Arc::new(AtomicU64::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let executor = Arc::clone(&executor);
            let inside = Arc::clone(&inside);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut ctx = executor.context(worker);
                barrier.wait();
                for _ in 0..50 {
                    executor
                        .run(&mut ctx, || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(inside.load(Ordering::SeqCst), 0);
}
