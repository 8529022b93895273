//! Execution context trait for behaviour steps.

use std::time::Duration;

/// The interface between a running behaviour and the outside world.
///
/// Behaviours never sleep or print directly; they go through the context so
/// that the same behaviour runs against the wall clock during a test run and
/// against a virtual clock in unit tests.
///
/// # Implementations
///
/// - **Wall clock**: `WallClockContext` - `std::thread::sleep`, stdout reports
/// - **Simulation**: `SimClock` (in `bdd_sim`) - virtual time, recorded reports
pub trait ExecContext {
    /// Returns the elapsed time since the context was created.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Blocks for the given duration.
    ///
    /// In production: sleeps the current thread
    /// In simulation: advances the virtual clock
    fn sleep(&mut self, duration: Duration);

    /// Emits one human-readable report line for a performed action.
    fn report(&mut self, line: &str);
}
