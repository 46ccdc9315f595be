//! # Elision
//!
//! Budgeted hardware-transactional critical sections with single-lock
//! fallback.
//!
//! A critical section runs inside a hardware transaction (Intel RTM) when it
//! can, and behind one lock shared by the whole domain when transactions keep
//! aborting. Every invocation gets a fresh budget of transactional attempts,
//! so a burst of conflicts never pins a thread to the slow path.
//!
//! ## Quick Start
//!
//! ```ignore
//! use elision::prelude::*;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let executor = ExecutorBuilder::new().statistics(true).build_hardware()?;
//! let counter = CacheAligned::new(AtomicU64::new(0));
//!
//! // One context per thread
//! let mut ctx = executor.context(0);
//! let outcome = executor.run(&mut ctx, || {
//!     let v = counter.load(Ordering::Relaxed);
//!     counter.store(v + 1, Ordering::Relaxed);
//!     Ok(())
//! })?;
//!
//! println!("{outcome}: {}", ctx.stats().unwrap().summary());
//! ```
//!
//! ## Layers
//!
//! - [`elision_core`] - status words, classifier, config, outcomes, stats
//! - [`elision_htm`] - transaction adapters (RTM, unsupported, simulated)
//! - [`elision_concurrency`] - context, fallback lock, executor

#![warn(missing_docs)]

mod builder;
mod error;

pub mod prelude;

// Re-export main entry points
pub use builder::ExecutorBuilder;
pub use error::{Error, Result};

// Re-export the layers
pub use elision_concurrency::{BudgetedExecutor, FallbackGuard, FallbackLock, TransactionContext};
pub use elision_core::{
    classify, AbortKind, AbortReason, AbortStats, BeginResult, BodyResult, CacheAligned,
    ConfigError, ExecutionOutcome, ExecutorConfig, ExecutorError, ExplicitAbort, RawStatus,
    RetryPolicy, CACHE_LINE_SIZE, DEFAULT_INITIAL_BUDGET, DEFAULT_LOCK_BUSY_CODE,
};
pub use elision_htm::{
    HardwareHtm, OverlapMode, Rtm, SimulatedHtm, TransactionalMemory, Unsupported,
};

pub use elision_concurrency;
pub use elision_core;
pub use elision_htm;
