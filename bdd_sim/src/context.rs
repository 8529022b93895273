//! Simulation context implementing ExecContext for deterministic testing.

use bdd_env::ExecContext;
use std::time::Duration;

/// Execution context backed by a virtual clock.
///
/// This implements `ExecContext` using:
/// - A virtual clock that only moves on `sleep` or `advance_time`
/// - An in-memory log of report lines instead of stdout
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: u64,

    /// Report lines in emission order
    reports: Vec<String>,

    /// Echo reports to stdout as well
    echo: bool,
}

impl SimClock {
    /// Creates a clock at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock that also prints every report line.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&mut self, duration: Duration) {
        self.virtual_time_ns = self
            .virtual_time_ns
            .saturating_add(duration.as_nanos() as u64);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns
    }

    /// Report lines emitted so far.
    pub fn reports(&self) -> &[String] {
        &self.reports
    }

    /// Drains the recorded report lines.
    pub fn take_reports(&mut self) -> Vec<String> {
        std::mem::take(&mut self.reports)
    }
}

impl ExecContext for SimClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.virtual_time_ns)
    }

    fn sleep(&mut self, duration: Duration) {
        // In simulation, sleep advances virtual time
        self.advance_time(duration);
    }

    fn report(&mut self, line: &str) {
        if self.echo {
            println!("{}", line);
        }
        self.reports.push(line.to_string());
    }
}
