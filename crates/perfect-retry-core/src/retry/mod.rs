//! Retry engine.
//!
//! A [`Policy`] bundles the retry limit, the delay strategy, the report sink
//! and the predicate separating retryable from fatal failures. A [`Retrier`]
//! runs work under a policy: it retries retryable failures until the limit is
//! spent, reporting each retried failure before sleeping, and hands fatal
//! failures back untouched.

pub mod delay;

mod cancel;
mod classify;
mod error;
mod event;
mod policy;
mod registry;
mod run;

pub use cancel::CancelToken;
pub use classify::{classify, Classification, Classify};
pub use error::RetryError;
pub use event::{NoopSink, ReportSink, RetryEvent, TracingSink};
pub use policy::{Limit, Policy, PolicyBuilder, PolicyError, DEFAULT_LIMIT};
pub use registry::{PolicyRegistry, UnknownPolicy};
pub use run::{with_retry, Retrier};
