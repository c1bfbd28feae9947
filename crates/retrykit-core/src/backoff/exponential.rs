//! Exponential backoff with a saturating cap.

use super::{BackoffStrategy, MAX_DELAY, MAX_DELAY_MILLIS};
use crate::error::ConfigError;
use std::time::Duration;

/// Doubles the delay on every attempt: `base * 2^attempt` milliseconds,
/// capped at [`MAX_DELAY`].
///
/// Growth saturates instead of overflowing: attempt numbers of 63 or more,
/// and any product that would not fit in 64 bits, both yield the cap. The
/// overflow check is a pre-multiplication bound test, so the multiplication
/// itself can never wrap.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::backoff::{BackoffStrategy, ExponentialBackoff, MAX_DELAY};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::new(Duration::from_millis(100))?;
/// assert_eq!(backoff.compute_delay(0), Duration::from_millis(100));
/// assert_eq!(backoff.compute_delay(3), Duration::from_millis(800));
/// assert_eq!(backoff.compute_delay(200), MAX_DELAY);
/// # Ok::<(), retrykit_core::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base_millis: u64,
}

impl ExponentialBackoff {
    /// Create an exponential backoff from a strictly positive base delay.
    ///
    /// Fails with [`ConfigError::NonPositiveDelay`] if `base` rounds down
    /// to zero milliseconds.
    pub fn new(base: Duration) -> Result<Self, ConfigError> {
        let base_millis = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        if base_millis == 0 {
            return Err(ConfigError::NonPositiveDelay { name: "base delay" });
        }
        Ok(Self { base_millis })
    }

    /// The configured base delay.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_millis)
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn compute_delay(&self, attempt: u32) -> Duration {
        // 2^63 and beyond cannot be represented as a shift of 1u64 without
        // the product wrapping for any positive base.
        if attempt >= 63 {
            return MAX_DELAY;
        }
        let multiplier = 1u64 << attempt;
        if self.base_millis > u64::MAX / multiplier {
            return MAX_DELAY;
        }
        Duration::from_millis((self.base_millis * multiplier).min(MAX_DELAY_MILLIS))
    }
}
