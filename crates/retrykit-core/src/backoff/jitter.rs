//! Uniformly random delay within a configured inclusive range.

use super::BackoffStrategy;
use crate::error::ConfigError;
use rand::Rng;
use std::time::Duration;

/// Samples a uniformly distributed delay from `[min, max]`, both ends
/// inclusive, ignoring the attempt number. Randomized delays spread
/// concurrent retries apart to prevent thundering herd problems.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::backoff::{BackoffStrategy, JitterBackoff};
/// use std::time::Duration;
///
/// let backoff = JitterBackoff::new(Duration::from_millis(50), Duration::from_millis(150))?;
/// let delay = backoff.compute_delay(1);
/// assert!(delay >= Duration::from_millis(50));
/// assert!(delay <= Duration::from_millis(150));
/// # Ok::<(), retrykit_core::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBackoff {
    min_millis: u64,
    max_millis: u64,
}

impl JitterBackoff {
    /// Create a jittered backoff over the inclusive range `[min, max]`.
    ///
    /// Fails with [`ConfigError::InvalidJitterRange`] if `min > max`, and
    /// with [`ConfigError::JitterMaxTooLarge`] if `max` reaches the highest
    /// representable millisecond value, which stays reserved so an
    /// exclusive upper bound can never overflow.
    pub fn new(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidJitterRange);
        }
        let max_millis = match u64::try_from(max.as_millis()) {
            Ok(millis) if millis < u64::MAX => millis,
            _ => return Err(ConfigError::JitterMaxTooLarge),
        };
        let min_millis =
            u64::try_from(min.as_millis()).map_err(|_| ConfigError::JitterMaxTooLarge)?;
        Ok(Self { min_millis, max_millis })
    }

    /// The inclusive lower bound.
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_millis)
    }

    /// The inclusive upper bound.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_millis)
    }
}

impl BackoffStrategy for JitterBackoff {
    fn compute_delay(&self, _attempt: u32) -> Duration {
        let millis = rand::thread_rng().gen_range(self.min_millis..=self.max_millis);
        Duration::from_millis(millis)
    }
}
