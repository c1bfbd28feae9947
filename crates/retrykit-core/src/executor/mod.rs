//! Retry executors: drive the attempt loop to success, fallback, or failure.
//!
//! Two structurally different forms share identical decision logic:
//!
//! - [`RetryExecutor`] runs the loop on the calling thread, blocking for
//!   each computed delay.
//! - [`AsyncRetryExecutor`] submits every attempt and every wait to a
//!   caller-supplied tokio runtime and hands back a [`RetryHandle`], so the
//!   calling thread never blocks.
//!
//! For the same policy, strategy, and task, both forms make the same number
//! of attempts and apply the same fallback precedence; they differ only in
//! how the outcome is delivered.

mod blocking;
mod scheduled;

pub use blocking::RetryExecutor;
pub use scheduled::{AsyncRetryExecutor, RetryHandle};

use crate::backoff::BackoffStrategy;
use crate::cancel::CancelToken;
use crate::error::ConfigError;
use crate::policy::RetryPolicy;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Builder assembling blocking and scheduled executors.
///
/// `retry_policy` and `backoff_strategy` are always required; `scheduler`
/// only by [`build_async`](Self::build_async). Building fails fast, before
/// any task is ever run.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::prelude::*;
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct Glitch;
/// impl Retryable for Glitch {}
///
/// let executor: RetryExecutor<Glitch> = RetryExecutorBuilder::new()
///     .retry_policy(RetryPolicy::with_max_attempts(3)?)
///     .backoff_strategy(ExponentialBackoff::new(Duration::from_millis(100))?)
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RetryExecutorBuilder<E> {
    retry_policy: Option<RetryPolicy<E>>,
    backoff_strategy: Option<Arc<dyn BackoffStrategy>>,
    scheduler: Option<Handle>,
    cancel_token: Option<CancelToken>,
}

impl<E> RetryExecutorBuilder<E> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            retry_policy: None,
            backoff_strategy: None,
            scheduler: None,
            cancel_token: None,
        }
    }

    /// Set the retry policy. Required.
    pub fn retry_policy(mut self, policy: RetryPolicy<E>) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Set the backoff strategy. Required.
    pub fn backoff_strategy(mut self, strategy: impl BackoffStrategy + 'static) -> Self {
        self.backoff_strategy = Some(Arc::new(strategy));
        self
    }

    /// Set an already-shared backoff strategy, letting one allocation back
    /// many executors.
    pub fn shared_backoff_strategy(mut self, strategy: Arc<dyn BackoffStrategy>) -> Self {
        self.backoff_strategy = Some(strategy);
        self
    }

    /// Set the scheduler the async form submits work to. Required by
    /// [`build_async`](Self::build_async) only; the runtime behind the
    /// handle is owned by the caller.
    pub fn scheduler(mut self, scheduler: Handle) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Attach a cancellation token to the blocking form's inter-attempt
    /// wait. Optional.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Build the blocking executor.
    ///
    /// Fails with [`ConfigError::Missing`] if the policy or strategy is
    /// unset.
    pub fn build(self) -> Result<RetryExecutor<E>, ConfigError> {
        let policy = self.retry_policy.ok_or(ConfigError::Missing("retry_policy"))?;
        let backoff = self.backoff_strategy.ok_or(ConfigError::Missing("backoff_strategy"))?;
        Ok(RetryExecutor::from_parts(policy, backoff, self.cancel_token))
    }

    /// Build the scheduled executor.
    ///
    /// Fails with [`ConfigError::Missing`] if the policy, strategy, or
    /// scheduler is unset.
    pub fn build_async(self) -> Result<AsyncRetryExecutor<E>, ConfigError> {
        let policy = self.retry_policy.ok_or(ConfigError::Missing("retry_policy"))?;
        let backoff = self.backoff_strategy.ok_or(ConfigError::Missing("backoff_strategy"))?;
        let scheduler = self.scheduler.ok_or(ConfigError::Missing("scheduler"))?;
        Ok(AsyncRetryExecutor::from_parts(policy, backoff, scheduler))
    }
}

impl<E> Default for RetryExecutorBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
