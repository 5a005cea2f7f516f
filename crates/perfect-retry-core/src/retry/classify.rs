//! Classify failures into retryable or fatal.

use super::policy::Policy;

/// Failure types with a closed set of kinds, so a policy can name which kinds
/// to retry (see [`PolicyBuilder::retry_kinds`](super::PolicyBuilder::retry_kinds)).
pub trait Classify {
    type Kind: PartialEq + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Outcome of classifying one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The policy allows another attempt (subject to the limit).
    Retryable,
    /// Propagate immediately, unmodified and unreported.
    Fatal,
}

/// Classify a failure against the policy's retryable predicate.
pub fn classify<E>(policy: &Policy<E>, failure: &E) -> Classification {
    if policy.is_retryable(failure) {
        Classification::Retryable
    } else {
        Classification::Fatal
    }
}
