//! Retry events and the sinks that receive them.

use std::fmt;

use tracing::Level;

use super::policy::Limit;

/// One retryable failure that is about to be retried.
///
/// Built fresh for every report; the failure is borrowed from the loop.
pub struct RetryEvent<'a> {
    /// 1-based index of the attempt that failed.
    pub attempt: u32,
    pub limit: Limit,
    pub failure: &'a dyn fmt::Display,
    /// Rust type name of the failure value.
    pub failure_type: &'static str,
    /// `[attempt/limit] type: failure. Retrying...`
    pub message: String,
}

impl<'a> RetryEvent<'a> {
    pub fn new<E: fmt::Display>(attempt: u32, limit: Limit, failure: &'a E) -> Self {
        let failure_type = std::any::type_name::<E>();
        let message = format!(
            "[{}/{}] {}: {}. Retrying...",
            attempt, limit, failure_type, failure
        );
        Self {
            attempt,
            limit,
            failure,
            failure_type,
            message,
        }
    }
}

impl fmt::Debug for RetryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEvent")
            .field("attempt", &self.attempt)
            .field("limit", &self.limit)
            .field("failure", &self.failure.to_string())
            .field("failure_type", &self.failure_type)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for RetryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives one event per retried failure, before the delay.
///
/// A panicking sink is not caught: the panic unwinds out of the retry loop.
pub trait ReportSink: Send + Sync {
    fn report(&self, event: &RetryEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ReportSink for NoopSink {
    fn report(&self, _event: &RetryEvent<'_>) {}
}

impl<F> ReportSink for F
where
    F: Fn(&RetryEvent<'_>) + Send + Sync,
{
    fn report(&self, event: &RetryEvent<'_>) {
        self(event)
    }
}

/// Logs each event through `tracing` at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self { level: Level::WARN }
    }
}

impl TracingSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl ReportSink for TracingSink {
    fn report(&self, event: &RetryEvent<'_>) {
        let attempt = event.attempt;
        if self.level == Level::ERROR {
            tracing::error!(attempt, limit = %event.limit, "{}", event.message);
        } else if self.level == Level::WARN {
            tracing::warn!(attempt, limit = %event.limit, "{}", event.message);
        } else if self.level == Level::INFO {
            tracing::info!(attempt, limit = %event.limit, "{}", event.message);
        } else if self.level == Level::DEBUG {
            tracing::debug!(attempt, limit = %event.limit, "{}", event.message);
        } else {
            tracing::trace!(attempt, limit = %event.limit, "{}", event.message);
        }
    }
}
