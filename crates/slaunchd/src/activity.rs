//! In-flight request accounting for the optional idle exit.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Counts requests that still owe a reply and remembers when that count last
/// changed.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    state: Arc<ActivityState>,
}

#[derive(Debug)]
struct ActivityState {
    in_flight: AtomicUsize,
    last_change: Mutex<Instant>,
}

impl Default for ActivityState {
    fn default() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            last_change: Mutex::new(Instant::now()),
        }
    }
}

impl ActivityState {
    fn touch(&self) {
        *self
            .last_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }
}

impl ActivityTracker {
    /// Creates a tracker with no requests in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a request as in flight until the returned guard is dropped.
    #[must_use]
    pub fn begin(&self) -> ActivityGuard {
        self.state.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.touch();
        ActivityGuard {
            state: Arc::clone(&self.state),
        }
    }

    /// Number of requests currently owing a reply.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Time since the last request finished, or `None` while any is in flight.
    #[must_use]
    pub fn idle_for(&self) -> Option<Duration> {
        if self.in_flight() > 0 {
            return None;
        }
        let last_change = *self
            .state
            .last_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Some(last_change.elapsed())
    }
}

/// Keeps one request counted as in flight for as long as it lives.
pub struct ActivityGuard {
    state: Arc<ActivityState>,
}

impl fmt::Debug for ActivityGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityGuard").finish_non_exhaustive()
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.state.touch();
    }
}
