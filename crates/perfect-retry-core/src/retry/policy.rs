use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::classify::Classify;
use super::delay;
use super::event::{NoopSink, ReportSink};

/// Retry limit default when none is configured.
pub const DEFAULT_LIMIT: u32 = 5;

/// How many retries a policy allows after the first attempt.
///
/// `Finite(n)` lets the work run at most `n + 1` times: the first attempt plus
/// `n` retries. `Unlimited` never gives up on a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Finite(u32),
    Unlimited,
}

impl Limit {
    /// True when a failure on 1-based `attempt` leaves no retry budget.
    pub fn is_exhausted_at(self, attempt: u32) -> bool {
        match self {
            Limit::Finite(n) => attempt > n,
            Limit::Unlimited => false,
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Finite(DEFAULT_LIMIT)
    }
}

impl From<Option<u32>> for Limit {
    fn from(value: Option<u32>) -> Self {
        value.map(Limit::Finite).unwrap_or(Limit::Unlimited)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Finite(n) => write!(f, "{}", n),
            Limit::Unlimited => f.write_str("Infinity"),
        }
    }
}

/// Invalid policy configuration, reported by [`PolicyBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("retry limit must be at least 1 (got {0}); use Limit::Unlimited to disable the cap")]
    InvalidLimit(u32),
}

pub(crate) type DelayFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;
pub(crate) type RetryablePredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Immutable retry configuration: limit, delay strategy, report sink and the
/// predicate deciding which failures are retryable.
///
/// Cloning is cheap (collaborators are reference counted) and a policy can be
/// shared between threads running independent retry loops.
pub struct Policy<E> {
    limit: Limit,
    delay: DelayFn,
    sink: Arc<dyn ReportSink>,
    retryable: RetryablePredicate<E>,
}

impl<E> Clone for Policy<E> {
    fn clone(&self) -> Self {
        Self {
            limit: self.limit,
            delay: Arc::clone(&self.delay),
            sink: Arc::clone(&self.sink),
            retryable: Arc::clone(&self.retryable),
        }
    }
}

impl<E> fmt::Debug for Policy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("limit", &self.limit)
            .field("delay", &"<fn>")
            .field("sink", &"<sink>")
            .field("retryable", &"<predicate>")
            .finish()
    }
}

impl<E> Default for Policy<E> {
    fn default() -> Self {
        Self {
            limit: Limit::default(),
            delay: Arc::new(delay::constant(delay::DEFAULT_DELAY)),
            sink: Arc::new(NoopSink),
            retryable: Arc::new(|_: &E| true),
        }
    }
}

impl<E> Policy<E> {
    pub fn builder() -> PolicyBuilder<E> {
        PolicyBuilder::new()
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    /// Delay to wait after the failure of 1-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        (self.delay)(attempt)
    }

    pub fn sink(&self) -> &dyn ReportSink {
        self.sink.as_ref()
    }

    pub fn is_retryable(&self, failure: &E) -> bool {
        (self.retryable)(failure)
    }
}

/// Builder for [`Policy`]. Every option has a default; only the limit is
/// validated, in [`build`](Self::build).
pub struct PolicyBuilder<E> {
    policy: Policy<E>,
}

impl<E> Default for PolicyBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> PolicyBuilder<E> {
    pub fn new() -> Self {
        Self {
            policy: Policy::default(),
        }
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.policy.limit = limit;
        self
    }

    pub fn unlimited(self) -> Self {
        self.limit(Limit::Unlimited)
    }

    /// Delay strategy: maps the 1-based index of the failed attempt to the
    /// pause before the next one. See [`delay`] for ready-made strategies.
    pub fn delay<F>(mut self, strategy: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.policy.delay = Arc::new(strategy);
        self
    }

    pub fn sink<S>(mut self, sink: S) -> Self
    where
        S: ReportSink + 'static,
    {
        self.policy.sink = Arc::new(sink);
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.policy.sink = sink;
        self
    }

    /// Failures for which `predicate` returns false are fatal: propagated at
    /// once, never reported, never retried.
    pub fn retry_if<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.policy.retryable = Arc::new(predicate);
        self
    }

    pub fn build(self) -> Result<Policy<E>, PolicyError> {
        if let Limit::Finite(0) = self.policy.limit {
            return Err(PolicyError::InvalidLimit(0));
        }
        Ok(self.policy)
    }
}

impl<E> PolicyBuilder<E>
where
    E: Classify,
{
    /// Retry only failures whose kind is listed; everything else is fatal.
    pub fn retry_kinds<I>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = E::Kind>,
    {
        let kinds: Vec<E::Kind> = kinds.into_iter().collect();
        self.retry_if(move |e: &E| kinds.contains(&e.kind()))
    }

    /// Retry every failure except those whose kind is listed.
    pub fn fatal_kinds<I>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = E::Kind>,
    {
        let kinds: Vec<E::Kind> = kinds.into_iter().collect();
        self.retry_if(move |e: &E| !kinds.contains(&e.kind()))
    }
}
