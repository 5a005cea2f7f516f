//! Terminal failures of a retry loop.

use std::fmt;

/// Why [`Retrier::execute`](super::Retrier::execute) gave up.
///
/// Intermediate retryable failures never show up here; only the failure that
/// ended the loop does.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The work failed with a failure the policy does not retry. Carries the
    /// original failure unchanged.
    Fatal(E),
    /// The retry limit was reached. `last` is the failure of the final
    /// attempt, `attempts` the number of times the work ran.
    Exhausted { last: E, attempts: u32 },
    /// A cancel token fired while waiting between attempts.
    Cancelled { last: E, attempts: u32 },
}

impl<E> RetryError<E> {
    /// Number of times the work was invoked before the loop ended, when known.
    /// `Fatal` does not track it.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RetryError::Fatal(_) => None,
            RetryError::Exhausted { attempts, .. } | RetryError::Cancelled { attempts, .. } => {
                Some(*attempts)
            }
        }
    }

    pub fn last_failure(&self) -> &E {
        match self {
            RetryError::Fatal(e)
            | RetryError::Exhausted { last: e, .. }
            | RetryError::Cancelled { last: e, .. } => e,
        }
    }

    /// Drop the retry context and return the underlying failure.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(e)
            | RetryError::Exhausted { last: e, .. }
            | RetryError::Cancelled { last: e, .. } => e,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RetryError::Fatal(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Fatal(e) => write!(f, "{}", e),
            RetryError::Exhausted { last, attempts } => {
                write!(f, "too many retries ({} attempts): {}", attempts, last)
            }
            RetryError::Cancelled { last, attempts } => {
                write!(f, "retry cancelled after {} attempts: {}", attempts, last)
            }
        }
    }
}

/// `Fatal` is transparent, so its source is the wrapped failure's own source.
/// `Exhausted` and `Cancelled` expose the last failure as their source.
impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Fatal(e) => e.source(),
            RetryError::Exhausted { last, .. } | RetryError::Cancelled { last, .. } => Some(last),
        }
    }
}
