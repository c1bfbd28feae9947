#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry-execution engine for embedding in service clients and background jobs.
//!
//! Given a unit of work that may fail transiently, this crate decides whether
//! to retry, how long to wait between attempts, and what to do once retries
//! are exhausted. Four small abstractions cooperate:
//!
//! - **Backoff strategies** ([`backoff::BackoffStrategy`]) map an attempt
//!   number to a delay: fixed, none, exponential with a saturating cap, or
//!   uniformly jittered.
//! - **Classifiers** ([`classify::RetryClassifier`]) decide whether a given
//!   failure is worth another attempt; the default recognizes the
//!   [`classify::Retryable`] marker capability.
//! - **Policies** ([`policy::RetryPolicy`]) combine a classifier with a
//!   maximum-attempts budget into a retry/stop decision.
//! - **Executors** ([`executor::RetryExecutor`],
//!   [`executor::AsyncRetryExecutor`]) drive the attempt loop, either
//!   blocking the calling thread or as scheduled work on a caller-supplied
//!   tokio runtime, with fallback semantics on exhaustion.
//!
//! Every building block is immutable and `Send + Sync`; a single strategy,
//! policy, or executor instance can back unboundedly many concurrent retry
//! loops without locking.
//!
//! # Examples
//!
//! ```rust
//! use retrykit_core::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("temporarily unavailable")]
//! struct Unavailable;
//!
//! impl Retryable for Unavailable {}
//!
//! let policy = RetryPolicy::with_max_attempts(3)?;
//! let backoff = FixedBackoff::new(Duration::from_millis(10))?;
//! let executor = RetryExecutor::new(policy, backoff);
//!
//! let mut attempts = 0;
//! let value = executor.execute(|| {
//!     attempts += 1;
//!     if attempts < 3 {
//!         Err(Unavailable)
//!     } else {
//!         Ok(attempts)
//!     }
//! })?;
//! assert_eq!(value, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backoff;
pub mod cancel;
pub mod classify;
pub mod error;
pub mod executor;
pub mod policy;

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use retrykit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{
        BackoffStrategy, ExponentialBackoff, FixedBackoff, JitterBackoff, MAX_DELAY, NO_DELAY,
        NoDelayBackoff,
    };
    pub use crate::cancel::CancelToken;
    pub use crate::classify::{DefaultClassifier, RetryClassifier, Retryable};
    pub use crate::error::{ConfigError, RetryError};
    pub use crate::executor::{AsyncRetryExecutor, RetryExecutor, RetryExecutorBuilder, RetryHandle};
    pub use crate::policy::{RetryPolicy, RetryPolicyBuilder};
}
