//! Retry policy: an attempt budget combined with failure classification.

use crate::classify::{DefaultClassifier, RetryClassifier, Retryable};
use crate::error::ConfigError;
use std::fmt;
use std::sync::Arc;

/// Attempt budget used by [`RetryPolicyBuilder`] when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Decides whether a failed attempt should be retried.
///
/// A policy pairs a [`RetryClassifier`] with a maximum-attempts budget;
/// [`should_retry`](Self::should_retry) passes only while both allow
/// another attempt. Policies are immutable and cheap to clone (the
/// classifier is shared), so a single instance can serve unboundedly many
/// concurrent retry loops.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::classify::Retryable;
/// use retrykit_core::policy::RetryPolicy;
///
/// #[derive(Debug)]
/// struct Glitch;
/// impl Retryable for Glitch {}
///
/// let policy = RetryPolicy::with_max_attempts(3)?;
/// assert!(policy.should_retry(1, &Glitch));
/// assert!(policy.should_retry(2, &Glitch));
/// assert!(!policy.should_retry(3, &Glitch));
/// # Ok::<(), retrykit_core::error::ConfigError>(())
/// ```
pub struct RetryPolicy<E> {
    classifier: Arc<dyn RetryClassifier<E>>,
    max_attempts: u32,
}

impl<E> RetryPolicy<E> {
    /// Create a policy from a classifier and a strictly positive budget.
    ///
    /// Fails with [`ConfigError::NonPositiveMaxAttempts`] if
    /// `max_attempts` is zero.
    pub fn new(
        classifier: impl RetryClassifier<E> + 'static,
        max_attempts: u32,
    ) -> Result<Self, ConfigError> {
        Self::from_shared(Arc::new(classifier), max_attempts)
    }

    fn from_shared(
        classifier: Arc<dyn RetryClassifier<E>>,
        max_attempts: u32,
    ) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::NonPositiveMaxAttempts);
        }
        Ok(Self { classifier, max_attempts })
    }

    /// Start building a policy with defaults: a budget of
    /// [`DEFAULT_MAX_ATTEMPTS`] and the [`DefaultClassifier`].
    pub fn builder() -> RetryPolicyBuilder<E> {
        RetryPolicyBuilder::new()
    }

    /// `true` while another attempt is allowed: the budget is not yet
    /// exhausted and the classifier deems `failure` retryable.
    ///
    /// `attempts` is the 1-based number of attempts made so far.
    pub fn should_retry(&self, attempts: u32, failure: &E) -> bool {
        attempts < self.max_attempts && self.classifier.is_retryable(Some(failure))
    }

    /// The configured attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The configured classifier.
    pub fn classifier(&self) -> &Arc<dyn RetryClassifier<E>> {
        &self.classifier
    }
}

impl<E: Retryable + 'static> RetryPolicy<E> {
    /// Convenience constructor binding the [`DefaultClassifier`] with a
    /// caller-chosen budget.
    pub fn with_max_attempts(max_attempts: u32) -> Result<Self, ConfigError> {
        Self::new(DefaultClassifier, max_attempts)
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self { classifier: Arc::clone(&self.classifier), max_attempts: self.max_attempts }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RetryPolicy`].
///
/// Unset fields fall back to [`DEFAULT_MAX_ATTEMPTS`] and the
/// [`DefaultClassifier`]; [`build`](Self::build) validates eagerly. The
/// default-classifier fallback requires the failure type to carry the
/// [`Retryable`] capability; for other failure types construct the policy
/// through [`RetryPolicy::new`] with an explicit classifier.
pub struct RetryPolicyBuilder<E> {
    max_attempts: u32,
    classifier: Option<Arc<dyn RetryClassifier<E>>>,
}

impl<E> RetryPolicyBuilder<E> {
    /// Create a builder with default values.
    pub fn new() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, classifier: None }
    }

    /// Set the attempt budget.
    ///
    /// Default: [`DEFAULT_MAX_ATTEMPTS`]. Validated by
    /// [`build`](Self::build).
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the failure classifier.
    ///
    /// Default: [`DefaultClassifier`].
    pub fn classifier(mut self, classifier: impl RetryClassifier<E> + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }
}

impl<E: Retryable + 'static> RetryPolicyBuilder<E> {
    /// Validate the configuration and build the policy.
    pub fn build(self) -> Result<RetryPolicy<E>, ConfigError> {
        let classifier = self.classifier.unwrap_or_else(|| Arc::new(DefaultClassifier));
        RetryPolicy::from_shared(classifier, self.max_attempts)
    }
}

impl<E> Default for RetryPolicyBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
