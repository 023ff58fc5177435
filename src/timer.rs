//! Monotonic elapsed-duration timer.
//!
//! `std::time::Instant` is already a monotonic clock, so this module is a
//! thin, start/stop-able wrapper around it rather than a reimplementation.
//! Used by [`crate::pool`] to calibrate the spin→block threshold for
//! adaptive back-off.

use std::time::{Duration, Instant};

/// A start/stop elapsed-time timer.
pub struct Timer {
    started_at: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self { started_at: None, elapsed: Duration::ZERO }
    }

    /// Starts the timer. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(Instant::now());
        true
    }

    /// Stops the timer, freezing the elapsed duration. Returns `false` if
    /// not running.
    pub fn stop(&mut self) -> bool {
        let Some(started_at) = self.started_at.take() else {
            return false;
        };
        self.elapsed = started_at.elapsed();
        true
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// The elapsed duration: live if running, frozen otherwise.
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(t) => t.elapsed(),
            None => self.elapsed,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Times a single round-trip of `f` and returns the elapsed duration.
///
/// Used to calibrate `max_wait` for adaptive spin→block consumer loops: the
/// pool and strand consumers each time one blocking dequeue at startup and
/// double it.
pub fn calibrate<F: FnOnce()>(f: F) -> Duration {
    let start = Instant::now();
    f();
    start.elapsed()
}
