//! End-to-end behavior shared by the blocking and scheduled executors:
//! identical attempt counts, identical fallback precedence, and safe reuse
//! of shared instances across concurrent callers.

use retrykit_core::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreError {
    Busy,
    Corrupt,
}

impl Retryable for StoreError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

fn policy(max_attempts: u32) -> RetryPolicy<StoreError> {
    RetryPolicy::with_max_attempts(max_attempts).unwrap()
}

#[test]
fn both_forms_make_the_same_number_of_attempts() {
    let blocking = RetryExecutor::new(
        policy(3),
        FixedBackoff::new(Duration::from_millis(10)).unwrap(),
    );
    let calls = AtomicU32::new(0);
    let outcome = blocking.execute(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<u32, _>(StoreError::Busy)
    });
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome, Err(RetryError::Task(StoreError::Busy)));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let scheduled = AsyncRetryExecutor::new(
        policy(3),
        FixedBackoff::new(Duration::from_millis(10)).unwrap(),
        runtime.handle().clone(),
    );
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&calls);
    let handle = scheduled.execute_async(move || {
        let seen = Arc::clone(&seen);
        async move {
            seen.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(StoreError::Busy)
        }
    });
    let outcome = runtime.block_on(handle);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome, Err(RetryError::Task(StoreError::Busy)));
}

#[test]
fn both_forms_apply_the_same_fallback_precedence() {
    let blocking = RetryExecutor::new(policy(2), NO_DELAY);
    let outcome = blocking.execute_with_fallback_action(
        || Err::<u32, _>(StoreError::Busy),
        || Err(StoreError::Corrupt),
    );
    assert_eq!(outcome, Err(RetryError::Task(StoreError::Corrupt)));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let scheduled = AsyncRetryExecutor::new(policy(2), NO_DELAY, runtime.handle().clone());
    let handle = scheduled.execute_async_with_fallback_action(
        || async { Err::<u32, _>(StoreError::Busy) },
        || Err(StoreError::Corrupt),
    );
    assert_eq!(runtime.block_on(handle), Err(RetryError::Task(StoreError::Corrupt)));
}

#[test]
fn execute_async_does_not_block_the_caller() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let scheduled = AsyncRetryExecutor::new(
        policy(3),
        FixedBackoff::new(Duration::from_millis(200)).unwrap(),
        runtime.handle().clone(),
    );
    let start = Instant::now();
    let handle = scheduled.execute_async(|| async { Err::<u32, _>(StoreError::Busy) });
    // Submission returns right away even though the sequence has two 200ms
    // waits ahead of it.
    assert!(start.elapsed() < Duration::from_millis(200));
    let outcome = runtime.block_on(handle);
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(outcome, Err(RetryError::Task(StoreError::Busy)));
}

#[test]
fn shared_instances_serve_concurrent_callers() {
    let strategy: Arc<dyn BackoffStrategy> =
        Arc::new(JitterBackoff::new(Duration::from_millis(1), Duration::from_millis(3)).unwrap());
    let executor = Arc::new(
        RetryExecutorBuilder::new()
            .retry_policy(policy(3))
            .shared_backoff_strategy(Arc::clone(&strategy))
            .build()
            .unwrap(),
    );

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let executor = Arc::clone(&executor);
            scope.spawn(move || {
                let mut failures = 0;
                let value = executor.execute(|| {
                    if failures < 2 {
                        failures += 1;
                        Err(StoreError::Busy)
                    } else {
                        Ok(failures)
                    }
                });
                assert_eq!(value, Ok(2));
            });
        }
    });

    // The strategy saw concurrent callers but still honors its bounds.
    let delay = strategy.compute_delay(1);
    assert!(delay >= Duration::from_millis(1) && delay <= Duration::from_millis(3));
}
