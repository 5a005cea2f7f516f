//! Retry loop: run a closure until it succeeds, fails fatally, or the policy
//! runs out of retries.

use std::fmt;

use super::cancel::CancelToken;
use super::classify::{classify, Classification};
use super::error::RetryError;
use super::event::RetryEvent;
use super::policy::Policy;

/// Runs work under a [`Policy`].
///
/// The retrier holds no per-call state, so one value can serve any number of
/// `execute` calls, including concurrent ones from different threads.
pub struct Retrier<E> {
    policy: Policy<E>,
    cancel: Option<CancelToken>,
}

impl<E> Clone for Retrier<E> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<E> fmt::Debug for Retrier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<E> Default for Retrier<E> {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

impl<E> Retrier<E> {
    pub fn new(policy: Policy<E>) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    /// Make the wait between attempts interruptible by `token`.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn policy(&self) -> &Policy<E> {
        &self.policy
    }
}

impl<E: fmt::Display> Retrier<E> {
    /// Calls `work` with the 1-based attempt index until it returns `Ok`.
    ///
    /// A retryable failure is checked against the limit first; only when
    /// another attempt is allowed is it reported to the sink, followed by the
    /// policy's delay. The attempt that exhausts the limit is never reported.
    /// Fatal failures return at once, unreported.
    pub fn execute<T, F>(&self, mut work: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Result<T, E>,
    {
        let limit = self.policy.limit();
        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            let failure = match work(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if classify(&self.policy, &failure) == Classification::Fatal {
                tracing::debug!(attempt, "fatal failure, not retrying: {}", failure);
                return Err(RetryError::Fatal(failure));
            }

            if limit.is_exhausted_at(attempt) {
                tracing::debug!(attempt, %limit, "retry limit reached: {}", failure);
                return Err(RetryError::Exhausted {
                    last: failure,
                    attempts: attempt,
                });
            }

            self.policy
                .sink()
                .report(&RetryEvent::new(attempt, limit, &failure));

            let delay = self.policy.delay_for(attempt);
            match &self.cancel {
                Some(token) => {
                    if !token.sleep(delay) {
                        tracing::debug!(attempt, "retry cancelled while waiting");
                        return Err(RetryError::Cancelled {
                            last: failure,
                            attempts: attempt,
                        });
                    }
                }
                None => {
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
            }
        }
    }
}

/// Run `work` under the default policy (5 retries, 250 ms apart, every
/// failure retryable, no reporting).
pub fn with_retry<T, E, F>(work: F) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    Retrier::default().execute(work)
}
