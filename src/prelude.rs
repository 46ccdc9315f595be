//! Convenient imports for Elision.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```ignore
//! use elision::prelude::*;
//!
//! let executor = ExecutorBuilder::new().build_hardware()?;
//! let mut ctx = executor.context(0);
//! executor.run(&mut ctx, || Ok(()))?;
//! ```

// Main entry point
pub use crate::builder::ExecutorBuilder;

// Error handling
pub use crate::error::{Error, Result};

// Executor and per-thread state
pub use elision_concurrency::{BudgetedExecutor, FallbackLock, TransactionContext};

// Critical-section types
pub use elision_core::{
    AbortStats, BodyResult, CacheAligned, ExecutionOutcome, ExecutorConfig, ExplicitAbort,
    RetryPolicy,
};

// Transaction adapters
pub use elision_htm::{HardwareHtm, SimulatedHtm, TransactionalMemory};
