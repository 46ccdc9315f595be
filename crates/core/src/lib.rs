//! Core types for elision
//!
//! This crate holds everything the executor and the transaction adapters share:
//! - [`RawStatus`] / [`BeginResult`]: the RTM abort status layout
//! - [`classify`]: abort status to [`AbortReason`]
//! - [`ExecutionOutcome`] and [`ExplicitAbort`]: what a critical section returns
//! - [`ExecutorConfig`]: budget, escape code, statistics and retry policy
//! - [`AbortStats`]: per-thread counters
//! - [`CacheAligned`]: cache-line isolation for protected data

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abort;
pub mod align;
pub mod config;
pub mod error;
pub mod outcome;
pub mod stats;
pub mod status;

pub use abort::{classify, AbortKind, AbortReason};
pub use align::{CacheAligned, CACHE_LINE_SIZE};
pub use config::{ExecutorConfig, RetryPolicy, DEFAULT_INITIAL_BUDGET, DEFAULT_LOCK_BUSY_CODE};
pub use error::{ConfigError, ExecutorError};
pub use outcome::{BodyResult, ExecutionOutcome, ExplicitAbort};
pub use stats::AbortStats;
pub use status::{BeginResult, RawStatus};
