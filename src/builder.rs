//! Executor construction.
//!
//! [`ExecutorBuilder`] assembles an [`ExecutorConfig`], optionally joins an
//! existing fallback-lock domain, and pairs the result with a transaction
//! adapter.

use crate::error::Result;
use elision_concurrency::{BudgetedExecutor, FallbackLock};
use elision_core::{ExecutorConfig, RetryPolicy};
use elision_htm::{HardwareHtm, TransactionalMemory};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`BudgetedExecutor`].
///
/// # Example
///
/// ```ignore
/// // Hardware transactions when the CPU has them, plain locking otherwise
/// let executor = ExecutorBuilder::new()
///     .initial_budget(10)
///     .statistics(true)
///     .build_hardware()?;
///
/// // Two policies over one domain
/// let lock = Arc::new(FallbackLock::new());
/// let retrying = ExecutorBuilder::new().shared_lock(lock.clone()).build_hardware()?;
/// let escaping = ExecutorBuilder::new()
///     .shared_lock(lock)
///     .escape_code(0xFF)
///     .build_hardware()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutorBuilder {
    config: ExecutorConfig,
    lock: Option<Arc<FallbackLock>>,
}

impl ExecutorBuilder {
    /// Builder with default settings (budget 10, no escape, no statistics).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ExecutorConfig) -> Self {
        Self { config, lock: None }
    }

    /// Start from a TOML configuration file.
    pub fn config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(ExecutorConfig::from_file(path)?))
    }

    /// Transactional attempts per invocation.
    pub fn initial_budget(mut self, budget: u32) -> Self {
        self.config = self.config.initial_budget(budget);
        self
    }

    /// Explicit abort code that ends an invocation without retry.
    pub fn escape_code(mut self, code: u8) -> Self {
        self.config = self.config.escape_code(code);
        self
    }

    /// Collect per-thread abort statistics.
    pub fn statistics(mut self, enabled: bool) -> Self {
        self.config = self.config.statistics(enabled);
        self
    }

    /// How abort reasons influence retries.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config = self.config.retry_policy(policy);
        self
    }

    /// Code used when a transaction finds the fallback lock held.
    pub fn lock_busy_code(mut self, code: u8) -> Self {
        self.config = self.config.lock_busy_code(code);
        self
    }

    /// Bound the time spent retrying transactionally.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config = self.config.deadline(deadline);
        self
    }

    /// Bound fallback lock acquisition.
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.lock_timeout(timeout);
        self
    }

    /// Join the domain guarded by `lock` instead of creating a new one.
    pub fn shared_lock(mut self, lock: Arc<FallbackLock>) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Configuration built so far.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Build an executor driving `htm`.
    pub fn build<H: TransactionalMemory>(self, htm: H) -> Result<BudgetedExecutor<H>> {
        let lock = self.lock.unwrap_or_default();
        Ok(BudgetedExecutor::with_lock(htm, lock, self.config)?)
    }

    /// Build an executor on the best transactional memory of this CPU.
    pub fn build_hardware(self) -> Result<BudgetedExecutor<HardwareHtm>> {
        let htm = HardwareHtm::detect();
        tracing::info!(adapter = htm.name(), "transactional memory selected");
        self.build(htm)
    }
}
