//! Blocking retry executor: the attempt loop runs on the caller's thread.

use crate::backoff::BackoffStrategy;
use crate::cancel::CancelToken;
use crate::error::RetryError;
use crate::policy::RetryPolicy;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Drives the attempt loop on the calling thread.
///
/// The loop invokes the task; on success the result returns immediately.
/// On failure the policy decides: retry (compute a delay, block, try
/// again) or stop (run the configured fallback, or re-raise the failure).
/// The executor is immutable and holds no per-invocation state, so a
/// single instance can run arbitrarily many concurrent invocations.
///
/// A [`CancelToken`] attached through
/// [`RetryExecutorBuilder`](super::RetryExecutorBuilder) makes the
/// inter-attempt wait interruptible: cancellation surfaces as
/// [`RetryError::Cancelled`] at once, without running any fallback, and
/// the token stays cancelled for any later observer.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::prelude::*;
/// use std::time::Duration;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("connection reset")]
/// struct Reset;
///
/// impl Retryable for Reset {}
///
/// let executor = RetryExecutor::new(
///     RetryPolicy::with_max_attempts(3)?,
///     FixedBackoff::new(Duration::from_millis(10))?,
/// );
///
/// let mut failures = 0;
/// let value = executor.execute(|| {
///     if failures < 2 {
///         failures += 1;
///         Err(Reset)
///     } else {
///         Ok("connected")
///     }
/// })?;
/// assert_eq!(value, "connected");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RetryExecutor<E> {
    policy: RetryPolicy<E>,
    backoff: Arc<dyn BackoffStrategy>,
    cancel: Option<CancelToken>,
}

impl<E> RetryExecutor<E> {
    /// Create an executor without cancellation support.
    pub fn new(policy: RetryPolicy<E>, backoff: impl BackoffStrategy + 'static) -> Self {
        Self::from_parts(policy, Arc::new(backoff), None)
    }

    pub(crate) fn from_parts(
        policy: RetryPolicy<E>,
        backoff: Arc<dyn BackoffStrategy>,
        cancel: Option<CancelToken>,
    ) -> Self {
        Self { policy, backoff, cancel }
    }

    /// Run `task` until it succeeds or the policy stops the loop; the last
    /// failure is re-raised as [`RetryError::Task`].
    pub fn execute<T>(&self, task: impl FnMut() -> Result<T, E>) -> Result<T, RetryError<E>> {
        self.execute_internal(task, |failure| Err(RetryError::Task(failure)))
    }

    /// Like [`execute`](Self::execute), but on exhaustion `fallback`
    /// supplies the result instead.
    ///
    /// A failure from the fallback itself supersedes the task failure.
    pub fn execute_with_fallback<T>(
        &self,
        task: impl FnMut() -> Result<T, E>,
        fallback: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, RetryError<E>> {
        self.execute_internal(task, |_failure| {
            debug!("running fallback supplier after retries stopped");
            fallback().map_err(RetryError::Task)
        })
    }

    /// Like [`execute`](Self::execute), but on exhaustion runs `action`
    /// once and then re-raises the original failure.
    ///
    /// A failure from the action takes precedence over the original.
    pub fn execute_with_fallback_action<T>(
        &self,
        task: impl FnMut() -> Result<T, E>,
        action: impl FnOnce() -> Result<(), E>,
    ) -> Result<T, RetryError<E>> {
        self.execute_internal(task, |failure| {
            debug!("running fallback action after retries stopped");
            match action() {
                Ok(()) => Err(RetryError::Task(failure)),
                Err(action_failure) => {
                    debug!("fallback action failed; superseding the task failure");
                    Err(RetryError::Task(action_failure))
                }
            }
        })
    }

    /// The attempt loop shared by every entry point; `on_stop` resolves
    /// the outcome once the policy refuses another attempt.
    fn execute_internal<T>(
        &self,
        mut task: impl FnMut() -> Result<T, E>,
        on_stop: impl FnOnce(E) -> Result<T, RetryError<E>>,
    ) -> Result<T, RetryError<E>> {
        let mut attempt: u32 = 1;
        loop {
            trace!(attempt, "invoking task");
            match task() {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    if !self.policy.should_retry(attempt, &failure) {
                        debug!(attempt, "retries stopped");
                        return on_stop(failure);
                    }
                    let delay = self.backoff.compute_delay(attempt);
                    debug!(attempt, ?delay, "task failed; waiting before next attempt");
                    self.wait(delay)?;
                    attempt += 1;
                }
            }
        }
    }

    /// Block between attempts, honoring the configured cancel token.
    fn wait(&self, delay: Duration) -> Result<(), RetryError<E>> {
        match &self.cancel {
            Some(token) => {
                if token.wait_timeout(delay) {
                    trace!("cancelled while waiting between attempts");
                    Err(RetryError::Cancelled)
                } else {
                    Ok(())
                }
            }
            None => {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                Ok(())
            }
        }
    }
}

impl<E> fmt::Debug for RetryExecutor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}
