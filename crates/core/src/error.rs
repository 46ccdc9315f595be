//! Error types for the executor and its configuration

use std::path::PathBuf;
use thiserror::Error;

/// Rejected or unreadable executor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The escape code would be indistinguishable from the lock-held abort
    #[error("escape code {code:#04x} collides with the lock-busy abort code")]
    EscapeCollidesWithLockCheck {
        /// The offending code
        code: u8,
    },

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`ExecutorConfig`](crate::ExecutorConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures surfaced by an executor invocation
///
/// Contention never produces an error; aborts are retried or routed to the
/// fallback lock.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The fallback lock could not be acquired within the configured timeout
    #[error("fallback lock not acquired within {timeout_ms}ms")]
    LockTimeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Executor constructed with an invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ExecutorError {
    /// Whether this is a lock acquisition timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutorError::LockTimeout { .. })
    }
}
