//! Cancellation of the wait between attempts.
//!
//! A [`CancelToken`] is shared between the thread running a retry loop and
//! whoever may want to stop it (signal handler, supervisor). Cancelling wakes
//! a waiting loop immediately; a running attempt is never interrupted.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct State {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable cancellation flag with a blocking, interruptible wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<State>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark cancelled and wake every thread blocked in [`sleep`](Self::sleep).
    pub fn cancel(&self) {
        *self.lock() = true;
        self.state.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Block for `duration` unless cancelled first.
    /// Returns true if the full duration elapsed, false if cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        // Durations too large for an Instant just wait for cancellation.
        let deadline = Instant::now().checked_add(duration);
        let mut cancelled = self.lock();
        loop {
            if *cancelled {
                return false;
            }
            cancelled = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    match self.state.wake.wait_timeout(cancelled, deadline - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .state
                    .wake
                    .wait(cancelled)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            };
        }
    }

    // The flag is a plain bool; a panic elsewhere cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.state
            .cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
