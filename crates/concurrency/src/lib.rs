//! Concurrency layer for elision
//!
//! This crate implements the budgeted transactional executor with:
//! - TransactionContext: per-thread retry budget and abort statistics
//! - FallbackLock: the single lock serializing the pessimistic path
//! - BudgetedExecutor: the retry/budget/fallback state machine

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod executor;
pub mod lock;

pub use context::TransactionContext;
pub use executor::BudgetedExecutor;
pub use lock::{FallbackGuard, FallbackLock};
