//! Scheduled retry executor: attempts run as units of work on a
//! caller-supplied tokio runtime.

use crate::backoff::BackoffStrategy;
use crate::error::RetryError;
use crate::policy::RetryPolicy;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Drives the attempt loop as scheduled work, never blocking the caller.
///
/// Every `execute_async*` call submits the attempt sequence to the
/// executor's scheduler and immediately returns a [`RetryHandle`]. The
/// decision logic matches [`RetryExecutor`](super::RetryExecutor) exactly:
/// for the same inputs both forms make the same number of attempts and
/// apply the same fallback precedence. Between attempts the sequence is
/// parked on the runtime's timer, so no thread sits idle, and attempt N+1
/// is never submitted before attempt N's failure has been observed and
/// classified.
///
/// The scheduler is externally owned: the executor only spawns onto the
/// [`Handle`] and never manages the runtime's threads or lifecycle.
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
/// let runtime = tokio::runtime::Runtime::new()?;
/// let executor = AsyncRetryExecutor::new(
///     RetryPolicy::with_max_attempts(3)?,
///     FixedBackoff::new(Duration::from_millis(10))?,
///     runtime.handle().clone(),
/// );
///
/// let handle = executor.execute_async(|| async { Ok::<_, Reset>("connected") });
/// assert_eq!(runtime.block_on(handle)?, "connected");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AsyncRetryExecutor<E> {
    policy: RetryPolicy<E>,
    backoff: Arc<dyn BackoffStrategy>,
    scheduler: Handle,
}

impl<E> AsyncRetryExecutor<E> {
    /// Create an executor submitting work to `scheduler`.
    pub fn new(
        policy: RetryPolicy<E>,
        backoff: impl BackoffStrategy + 'static,
        scheduler: Handle,
    ) -> Self {
        Self::from_parts(policy, Arc::new(backoff), scheduler)
    }

    pub(crate) fn from_parts(
        policy: RetryPolicy<E>,
        backoff: Arc<dyn BackoffStrategy>,
        scheduler: Handle,
    ) -> Self {
        Self { policy, backoff, scheduler }
    }
}

impl<E: Send + 'static> AsyncRetryExecutor<E> {
    /// Run `task` until it succeeds or the policy stops the loop; the
    /// handle then fails with [`RetryError::Task`] carrying the last
    /// failure.
    pub fn execute_async<T, F, Fut>(&self, task: F) -> RetryHandle<T, E>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.spawn_loop(task, |failure| Err(RetryError::Task(failure)))
    }

    /// Like [`execute_async`](Self::execute_async), but on exhaustion
    /// `fallback` supplies the handle's value instead.
    ///
    /// A failure from the fallback itself supersedes the task failure.
    pub fn execute_async_with_fallback<T, F, Fut, FB>(
        &self,
        task: F,
        fallback: FB,
    ) -> RetryHandle<T, E>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        FB: FnOnce() -> Result<T, E> + Send + 'static,
    {
        self.spawn_loop(task, |_failure| {
            debug!("running fallback supplier after retries stopped");
            fallback().map_err(RetryError::Task)
        })
    }

    /// Like [`execute_async`](Self::execute_async), but on exhaustion runs
    /// `action` once and then fails the handle with the original failure.
    ///
    /// A failure from the action takes precedence over the original.
    pub fn execute_async_with_fallback_action<T, F, Fut, A>(
        &self,
        task: F,
        action: A,
    ) -> RetryHandle<T, E>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        A: FnOnce() -> Result<(), E> + Send + 'static,
    {
        self.spawn_loop(task, |failure| {
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

    /// Submit the attempt sequence to the scheduler as one unit of work
    /// whose await points hand the thread back between attempts.
    fn spawn_loop<T, F, Fut>(
        &self,
        mut task: F,
        on_stop: impl FnOnce(E) -> Result<T, RetryError<E>> + Send + 'static,
    ) -> RetryHandle<T, E>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let policy = self.policy.clone();
        let backoff = Arc::clone(&self.backoff);
        let join = self.scheduler.spawn(async move {
            let mut attempt: u32 = 1;
            loop {
                trace!(attempt, "invoking task");
                match task().await {
                    Ok(value) => return Ok(value),
                    Err(failure) => {
                        if !policy.should_retry(attempt, &failure) {
                            debug!(attempt, "retries stopped");
                            return on_stop(failure);
                        }
                        let delay = backoff.compute_delay(attempt);
                        debug!(attempt, ?delay, "task failed; scheduling next attempt");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        });
        RetryHandle { join }
    }
}

impl<E> fmt::Debug for AsyncRetryExecutor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRetryExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Single-completion handle to an in-flight scheduled retry sequence.
///
/// Awaiting the handle yields the success value, the fallback outcome, or
/// the terminal failure; it completes exactly once, from exactly one
/// attempt's outcome. Dropping the handle detaches it and the sequence
/// keeps running; [`abort`](Self::abort) instead cancels the sequence,
/// including any pending delayed attempt, and the handle resolves to
/// [`RetryError::Cancelled`].
#[derive(Debug)]
pub struct RetryHandle<T, E> {
    join: JoinHandle<Result<T, RetryError<E>>>,
}

impl<T, E> RetryHandle<T, E> {
    /// Cancel the in-flight sequence through the scheduler.
    pub fn abort(&self) {
        self.join.abort();
    }

    /// Whether the sequence has concluded.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl<T, E> Future for RetryHandle<T, E> {
    type Output = Result<T, RetryError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().join).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(join_error)) => {
                if join_error.is_panic() {
                    std::panic::resume_unwind(join_error.into_panic());
                }
                Poll::Ready(Err(RetryError::Cancelled))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::{FixedBackoff, NO_DELAY};
    use crate::classify::Retryable;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    fn executor(max_attempts: u32, delay: Duration) -> AsyncRetryExecutor<TestError> {
        AsyncRetryExecutor::new(
            RetryPolicy::with_max_attempts(max_attempts).unwrap(),
            FixedBackoff::new(delay).unwrap(),
            Handle::current(),
        )
    }

    fn counting_task(
        calls: Arc<AtomicU32>,
        outcome: impl Fn(u32) -> Result<u32, TestError> + Send + Sync + 'static,
    ) -> impl FnMut() -> Pin<Box<dyn Future<Output = Result<u32, TestError>> + Send>> + Send + 'static
    {
        move || {
            let outcome = outcome(calls.fetch_add(1, Ordering::SeqCst) + 1);
            Box::pin(async move { outcome })
        }
    }

    #[tokio::test]
    async fn completes_with_the_success_value() {
        let executor = executor(3, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async(counting_task(Arc::clone(&calls), |_| Ok(7)));
        assert_eq!(handle.await, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_when_a_later_attempt_succeeds() {
        let executor = executor(3, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async(counting_task(Arc::clone(&calls), |n| {
            if n < 3 { Err(TestError::Transient) } else { Ok(n) }
        }));
        assert_eq!(handle.await, Ok(3));
    }

    #[tokio::test]
    async fn exhausted_budget_fails_the_handle() {
        let executor = executor(3, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async(counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)));
        assert_eq!(handle.await, Err(RetryError::Task(TestError::Transient)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_failure_stops_after_one_attempt() {
        let executor = executor(5, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async(counting_task(Arc::clone(&calls), |_| Err(TestError::Fatal)));
        assert_eq!(handle.await, Err(RetryError::Task(TestError::Fatal)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_supplier_resolves_the_handle() {
        let executor = executor(3, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async_with_fallback(
            counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)),
            || Ok(99),
        );
        assert_eq!(handle.await, Ok(99));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fallback_supplier_failure_supersedes_the_original() {
        let executor = executor(2, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async_with_fallback(
            counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)),
            || Err(TestError::Fatal),
        );
        assert_eq!(handle.await, Err(RetryError::Task(TestError::Fatal)));
    }

    #[tokio::test]
    async fn fallback_action_runs_once_then_fails_with_the_original() {
        let executor = executor(3, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let runs = Arc::new(AtomicU32::new(0));
        let action_runs = Arc::clone(&runs);
        let handle = executor.execute_async_with_fallback_action(
            counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)),
            move || {
                action_runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );
        assert_eq!(handle.await, Err(RetryError::Task(TestError::Transient)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fallback_action_failure_takes_precedence() {
        let executor = executor(2, Duration::from_millis(10));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async_with_fallback_action(
            counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)),
            || Err(TestError::Fatal),
        );
        assert_eq!(handle.await, Err(RetryError::Task(TestError::Fatal)));
    }

    #[tokio::test]
    async fn returns_before_the_sequence_concludes() {
        let executor = executor(3, Duration::from_millis(100));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async(counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)));
        // The spawned sequence cannot have finished yet: it still has two
        // 100ms waits ahead of it.
        assert!(!handle.is_finished());
        let mut pending = tokio_test::task::spawn(handle);
        tokio_test::assert_pending!(pending.poll());
        assert_eq!(pending.await, Err(RetryError::Task(TestError::Transient)));
    }

    #[tokio::test]
    async fn abort_cancels_the_pending_attempt() {
        let executor = executor(3, Duration::from_secs(30));
        let calls = Arc::new(AtomicU32::new(0));
        let handle = executor.execute_async(counting_task(Arc::clone(&calls), |_| Err(TestError::Transient)));
        // Let attempt 1 run and park the sequence on the 30s timer.
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
        assert_eq!(handle.await, Err(RetryError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_invocations_share_one_executor() {
        let executor = Arc::new(AsyncRetryExecutor::<TestError>::new(
            RetryPolicy::with_max_attempts(3).unwrap(),
            NO_DELAY,
            Handle::current(),
        ));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let calls = Arc::new(AtomicU32::new(0));
            handles.push((
                Arc::clone(&calls),
                executor.execute_async(counting_task(Arc::clone(&calls), |n| {
                    if n < 3 { Err(TestError::Transient) } else { Ok(n) }
                })),
            ));
        }
        for (calls, handle) in handles {
            assert_eq!(handle.await, Ok(3));
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }
    }
}
