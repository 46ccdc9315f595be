//! Executor configuration
//!
//! One [`ExecutorConfig`] replaces the compile-time hook points of a
//! macro-based HTM wrapper: initial budget, escape code, statistics and retry
//! policy are plain fields of a single value.
//!
//! ## TOML
//!
//! ```toml
//! initial_budget = 10
//! escape_code = 255
//! statistics = true
//! retry_policy = "reason-aware"
//! deadline_us = 500
//! lock_timeout_ms = 100
//! ```
//!
//! Every field is optional; missing fields take their [`Default`] value.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Transactional attempts granted to every invocation by default
pub const DEFAULT_INITIAL_BUDGET: u32 = 10;

/// Abort code used when a transaction finds the fallback lock held
pub const DEFAULT_LOCK_BUSY_CODE: u8 = 0xFE;

/// How abort reasons influence the retry decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Every abort costs one unit of budget, whatever its reason
    #[default]
    Uniform,
    /// Capacity overflows drain the budget immediately
    ReasonAware,
}

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Transactional attempts per invocation before taking the fallback lock
    pub initial_budget: u32,
    /// Explicit abort code that ends the invocation without retry or fallback
    pub escape_code: Option<u8>,
    /// Whether contexts created for this executor collect [`AbortStats`](crate::AbortStats)
    pub statistics: bool,
    /// Whether the abort reason changes the retry decision
    pub retry_policy: RetryPolicy,
    /// Code a transaction aborts with when it observes the fallback lock held
    pub lock_busy_code: u8,
    /// Wall-clock bound on the optimistic path, in microseconds
    pub deadline_us: Option<u64>,
    /// Bound on fallback lock acquisition, in milliseconds
    pub lock_timeout_ms: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            initial_budget: DEFAULT_INITIAL_BUDGET,
            escape_code: None,
            statistics: false,
            retry_policy: RetryPolicy::Uniform,
            lock_busy_code: DEFAULT_LOCK_BUSY_CODE,
            deadline_us: None,
            lock_timeout_ms: None,
        }
    }
}

impl ExecutorConfig {
    /// Retry transactionally for as long as it takes
    ///
    /// The budget is `u32::MAX`, so the fallback lock is taken only after
    /// four billion aborts in a single invocation.
    pub fn retry_only() -> Self {
        ExecutorConfig {
            initial_budget: u32::MAX,
            ..Default::default()
        }
    }

    /// `budget` attempts, then the fallback lock
    pub fn bounded(budget: u32) -> Self {
        ExecutorConfig {
            initial_budget: budget,
            ..Default::default()
        }
    }

    /// Default budget with per-thread abort statistics
    pub fn with_statistics() -> Self {
        ExecutorConfig {
            statistics: true,
            ..Default::default()
        }
    }

    /// Set the initial budget
    pub fn initial_budget(mut self, budget: u32) -> Self {
        self.initial_budget = budget;
        self
    }

    /// Set the escape code
    pub fn escape_code(mut self, code: u8) -> Self {
        self.escape_code = Some(code);
        self
    }

    /// Enable or disable statistics
    pub fn statistics(mut self, enabled: bool) -> Self {
        self.statistics = enabled;
        self
    }

    /// Set the retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set the lock-busy abort code
    pub fn lock_busy_code(mut self, code: u8) -> Self {
        self.lock_busy_code = code;
        self
    }

    /// Bound the time spent on the optimistic path
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline_us = Some(saturating_micros(deadline));
        self
    }

    /// Bound fallback lock acquisition
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    /// Optimistic-path deadline, if any
    pub fn deadline_duration(&self) -> Option<Duration> {
        self.deadline_us.map(Duration::from_micros)
    }

    /// Lock acquisition timeout, if any
    pub fn lock_timeout_duration(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Check field combinations
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.escape_code {
            Some(code) if code == self.lock_busy_code => {
                Err(ConfigError::EscapeCollidesWithLockCheck { code })
            }
            _ => Ok(()),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ExecutorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

fn saturating_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
