//! Error types for configuration and for terminal retry outcomes.

use thiserror::Error;

/// A construction or validation failure.
///
/// Every configuration error is detected synchronously, at construction or
/// build time, before any task is ever run.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A delay parameter was zero, or rounded down to zero milliseconds.
    #[error("{name} must be a positive number of milliseconds")]
    NonPositiveDelay {
        /// The rejected parameter.
        name: &'static str,
    },

    /// Jitter bounds were inverted: `min` exceeded `max`.
    #[error("invalid jitter range: min delay must not exceed max delay")]
    InvalidJitterRange,

    /// The jitter upper bound reached the reserved maximum millisecond
    /// value, which must stay available as an exclusive bound.
    #[error("jitter max delay too large; must be below {} ms", u64::MAX)]
    JitterMaxTooLarge,

    /// The attempt budget was zero.
    #[error("max attempts must be positive")]
    NonPositiveMaxAttempts,

    /// A builder was finalized without a required field.
    #[error("missing required {0}")]
    Missing(&'static str),
}

/// Terminal outcome of a retry-executor invocation.
///
/// Either the last failure observed once the policy stopped the loop (after
/// any configured fallback ran), or cancellation of the in-flight
/// invocation. Cancellation is never classified and never triggers a
/// fallback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The failure that ended the loop: the last task failure, or a
    /// fallback's own failure when that took precedence.
    #[error("retries stopped: {0}")]
    Task(E),

    /// Cancellation was observed while waiting between attempts, or the
    /// scheduled sequence was aborted through its handle.
    #[error("retry cancelled while waiting between attempts")]
    Cancelled,
}

impl<E> RetryError<E> {
    /// The underlying task or fallback failure, if any.
    pub fn into_task(self) -> Option<E> {
        match self {
            Self::Task(failure) => Some(failure),
            Self::Cancelled => None,
        }
    }

    /// `true` if the invocation was cancelled rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
