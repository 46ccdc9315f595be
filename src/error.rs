//! Unified error types for Elision.
//!
//! This module provides a clean error type that wraps the executor and
//! configuration errors and presents a consistent interface to users.

use elision_core::{ConfigError, ExecutorError};
use thiserror::Error;

/// All Elision errors.
///
/// Contention never shows up here: aborts are retried or routed through the
/// fallback lock. Only configuration problems and lock timeouts do.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected or unreadable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fallback lock not acquired within the configured timeout
    #[error("fallback lock not acquired within {timeout_ms}ms")]
    LockTimeout {
        /// Configured timeout
        timeout_ms: u64,
    },
}

/// Result type for Elision operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a lock timeout.
    ///
    /// Timeouts may succeed on retry once the lock holder finishes.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::LockTimeout { .. })
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

// Convert from executor errors
impl From<ExecutorError> for Error {
    fn from(e: ExecutorError) -> Self {
        match e {
            ExecutorError::LockTimeout { timeout_ms } => Error::LockTimeout { timeout_ms },
            ExecutorError::Config(e) => Error::Config(e),
        }
    }
}
