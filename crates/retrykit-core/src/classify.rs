//! Failure classification: which failures are worth retrying.

/// Marker capability for failure types that may be retried.
///
/// Implementing the trait declares the type explicitly retryable. The
/// provided method can refine the decision per value, which suits error
/// enums that mix transient and permanent variants:
///
/// ```rust
/// use retrykit_core::classify::Retryable;
///
/// #[derive(Debug)]
/// enum StoreError {
///     Busy,
///     Corrupt,
/// }
///
/// impl Retryable for StoreError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, StoreError::Busy)
///     }
/// }
/// ```
pub trait Retryable {
    /// Whether this particular failure is safe to retry.
    fn is_retryable(&self) -> bool {
        true
    }
}

/// Decides whether a failure is worth another attempt.
///
/// Classifiers are pure predicates: stateless, immutable, and shareable
/// across concurrent retry loops. Any `Fn(Option<&E>) -> bool` closure is a
/// classifier, so domain-specific rules need no new types:
///
/// ```rust
/// use retrykit_core::classify::RetryClassifier;
///
/// let timeouts_only = |failure: Option<&std::io::Error>| {
///     failure.is_some_and(|e| e.kind() == std::io::ErrorKind::TimedOut)
/// };
/// let interrupted = std::io::Error::new(std::io::ErrorKind::Interrupted, "stop");
/// assert!(!timeouts_only.is_retryable(Some(&interrupted)));
/// ```
pub trait RetryClassifier<E>: Send + Sync {
    /// `true` if `failure` should drive another attempt.
    ///
    /// An absent failure is never retryable.
    fn is_retryable(&self, failure: Option<&E>) -> bool;
}

impl<E, F> RetryClassifier<E> for F
where
    F: Fn(Option<&E>) -> bool + Send + Sync,
{
    fn is_retryable(&self, failure: Option<&E>) -> bool {
        self(failure)
    }
}

/// The default classifier.
///
/// A failure is retryable exactly when its type carries the [`Retryable`]
/// capability and the value reports itself retryable; everything else,
/// including the absence of a failure, is rejected. Zero-sized and
/// stateless, so one instance serves the whole process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultClassifier;

impl<E: Retryable> RetryClassifier<E> for DefaultClassifier {
    fn is_retryable(&self, failure: Option<&E>) -> bool {
        failure.is_some_and(|f| f.is_retryable())
    }
}
