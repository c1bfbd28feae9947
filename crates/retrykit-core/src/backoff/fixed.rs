//! Constant delay between attempts.

use super::BackoffStrategy;
use crate::error::ConfigError;
use std::time::Duration;

/// Waits the same configured delay before every retry.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::backoff::{BackoffStrategy, FixedBackoff};
/// use std::time::Duration;
///
/// let backoff = FixedBackoff::new(Duration::from_millis(250))?;
/// assert_eq!(backoff.compute_delay(1), Duration::from_millis(250));
/// assert_eq!(backoff.compute_delay(9), Duration::from_millis(250));
/// # Ok::<(), retrykit_core::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    /// Create a fixed backoff.
    ///
    /// Fails with [`ConfigError::NonPositiveDelay`] unless `delay` is a
    /// strictly positive number of milliseconds.
    pub fn new(delay: Duration) -> Result<Self, ConfigError> {
        if delay.as_millis() == 0 {
            return Err(ConfigError::NonPositiveDelay { name: "fixed delay" });
        }
        Ok(Self { delay })
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl BackoffStrategy for FixedBackoff {
    fn compute_delay(&self, _attempt: u32) -> Duration {
        self.delay
    }
}
