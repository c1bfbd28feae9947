//! Cooperative cancellation for blocking retry waits.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Cancels the wait between blocking retry attempts.
///
/// The token is level-triggered: once cancelled it stays cancelled, and
/// every waiter, current or future, observes the signal. Clones share the
/// same state, so one side hands a clone to the retrying thread and keeps
/// the other to signal with.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::cancel::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake any blocked waiter.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        drop(cancelled);
        self.inner.condvar.notify_all();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`, returning early on cancellation.
    ///
    /// Returns `true` if the wait ended because the token was cancelled.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if *cancelled {
                return true;
            }
            match deadline {
                Some(deadline) => {
                    let remaining = match deadline.checked_duration_since(Instant::now()) {
                        Some(remaining) if !remaining.is_zero() => remaining,
                        _ => return false,
                    };
                    let (guard, _) = self
                        .inner
                        .condvar
                        .wait_timeout(cancelled, remaining)
                        .unwrap_or_else(PoisonError::into_inner);
                    cancelled = guard;
                }
                // Timeout beyond the clock's range: only cancellation ends
                // the wait.
                None => {
                    cancelled = self
                        .inner
                        .condvar
                        .wait(cancelled)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}
