//! Production implementation of ExecContext using the system clock.

use crate::ExecContext;
use std::time::{Duration, Instant};

/// Context backed by the system clock; reports go to stdout.
#[derive(Debug)]
pub struct WallClockContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Number of report lines emitted
    reported: usize,
}

impl WallClockContext {
    /// Creates a new WallClockContext.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            reported: 0,
        }
    }

    /// Returns how many report lines were emitted.
    pub fn reported(&self) -> usize {
        self.reported
    }
}

impl Default for WallClockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecContext for WallClockContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn report(&mut self, line: &str) {
        println!("{}", line);
        self.reported += 1;
    }
}
