pub mod config;
pub mod logging;
pub mod retry;

pub use retry::{
    with_retry, CancelToken, Classify, Limit, Policy, PolicyBuilder, PolicyError, ReportSink,
    Retrier, RetryError, RetryEvent, TracingSink,
};
