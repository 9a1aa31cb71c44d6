//! Cooperative cancellation for blocking waits.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A cloneable, one-way cancellation flag.
///
/// Cancelling is sticky: once set, every clone observes it until the token is
/// dropped. Blocking waits in this crate take a token so a caller can cut the
/// wait short without relying on thread-local interrupt state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    changed: Condvar,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*cancelled {
            *cancelled = true;
            self.inner.changed.notify_all();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the token is cancelled or `timeout` elapses.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            cancelled = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    self.inner
                        .changed
                        .wait_timeout(cancelled, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                // Unrepresentable deadline: wait until cancelled.
                None => self
                    .inner
                    .changed
                    .wait(cancelled)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
        true
    }
}
