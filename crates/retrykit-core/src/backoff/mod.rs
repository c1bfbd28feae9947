//! Backoff strategies: how long to wait before the next attempt.
//!
//! A strategy is a pure function of the attempt number. Instances are
//! immutable, hold only their own configuration, and never touch shared
//! state, so one instance can back unboundedly many concurrent retry loops.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - the strategy contract
//! - [`FixedBackoff`] - constant delay
//! - [`NoDelayBackoff`] - immediate retry
//! - [`ExponentialBackoff`] - doubling delay with a saturating cap
//! - [`JitterBackoff`] - uniform random delay within inclusive bounds

mod exponential;
mod fixed;
mod jitter;
mod no_delay;

pub use exponential::ExponentialBackoff;
pub use fixed::FixedBackoff;
pub use jitter::JitterBackoff;
pub use no_delay::{NO_DELAY, NoDelayBackoff};

use std::time::Duration;

/// Upper bound on any exponentially computed delay: one hour.
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

pub(crate) const MAX_DELAY_MILLIS: u64 = 60 * 60 * 1000;

/// Maps an attempt number to the delay to wait before the next attempt.
///
/// Executors pass the 1-based count of attempts made so far; any value,
/// including 0, must yield a well-defined delay.
pub trait BackoffStrategy: Send + Sync {
    /// Compute the delay to wait after the given failed attempt.
    fn compute_delay(&self, attempt: u32) -> Duration;
}
