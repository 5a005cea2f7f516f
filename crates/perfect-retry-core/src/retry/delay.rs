//! Delay strategies: functions from the 1-based index of the failed attempt
//! to the pause before the next attempt.

use std::time::Duration;

/// Pause used by [`Policy::default`](super::Policy) between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

/// Largest exponent applied by [`exponential`]; keeps the multiplier finite.
const MAX_EXPONENT: u32 = 16;

/// No pause at all.
pub fn none() -> impl Fn(u32) -> Duration + Send + Sync + Clone + 'static {
    |_| Duration::ZERO
}

/// The same pause after every failure.
pub fn constant(delay: Duration) -> impl Fn(u32) -> Duration + Send + Sync + Clone + 'static {
    move |_| delay
}

/// `base * 2^(attempt-1)`, capped at `max`.
pub fn exponential(
    base: Duration,
    max: Duration,
) -> impl Fn(u32) -> Duration + Send + Sync + Clone + 'static {
    move |attempt| {
        let exp = attempt.saturating_sub(1).min(MAX_EXPONENT);
        base.saturating_mul(1u32 << exp).min(max)
    }
}

/// `unit * attempt^2`: 1, 4, 9, 16... units.
pub fn quadratic(unit: Duration) -> impl Fn(u32) -> Duration + Send + Sync + Clone + 'static {
    move |attempt| unit.saturating_mul(attempt.saturating_mul(attempt))
}
