//! Behaviour state machine and driver.

use crate::error::ExecError;
use bdd_env::{ExecContext, NamespaceManager};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Lifecycle state of a counter-bounded behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviourState {
    /// Freshly reset, no step taken
    Idle,

    /// At least one step taken, work remaining
    Running,

    /// Counter exhausted; only `reset` is allowed
    Finished,
}

/// A steppable unit simulating an actor's actions.
///
/// # States
/// `Idle` → `Running` → `Finished`, and back to `Idle` through `reset`.
/// Stepping a finished behaviour is an error.
pub trait Behaviour: std::fmt::Debug {
    /// Returns to `Idle` from any state.
    fn reset(&mut self, ctx: &mut dyn ExecContext);

    /// Performs one unit of work.
    fn step(&mut self, ctx: &mut dyn ExecContext) -> Result<(), ExecError>;

    /// True once the work is done. Never mutates.
    fn is_finished(&self) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> BehaviourState;
}

/// Participant parameters and tuning for building a behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BehaviourRequest {
    pub agent: String,
    pub object: String,
    pub pick_ws: String,
    pub place_ws: String,

    /// Steps per run; the behaviour's default when `None`
    pub max_count: Option<u32>,

    /// Simulated duration of each half-step; the behaviour's default when `None`
    pub step_delay: Option<Duration>,
}

impl BehaviourRequest {
    pub fn new(
        agent: impl Into<String>,
        object: impl Into<String>,
        pick_ws: impl Into<String>,
        place_ws: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            object: object.into(),
            pick_ws: pick_ws.into(),
            place_ws: place_ws.into(),
            max_count: None,
            step_delay: None,
        }
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    /// True if both requests name the same participants.
    pub fn same_participants(&self, other: &BehaviourRequest) -> bool {
        self.agent == other.agent
            && self.object == other.object
            && self.pick_ws == other.pick_ws
            && self.place_ws == other.place_ws
    }
}

/// Builds a behaviour from a request; registered per callable key.
pub type BehaviourFactory = fn(&BehaviourRequest, &NamespaceManager) -> Result<Box<dyn Behaviour>, ExecError>;

/// Resets the behaviour, then steps it until finished.
///
/// # Returns
/// The number of steps taken.
pub fn run_behaviour(behaviour: &mut dyn Behaviour, ctx: &mut dyn ExecContext) -> Result<usize, ExecError> {
    behaviour.reset(ctx);
    let mut steps = 0;
    while !behaviour.is_finished() {
        behaviour.step(ctx)?;
        steps += 1;
    }
    debug!("behaviour finished after {} steps", steps);
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimClock;

    /// Minimal counter behaviour exercising the driver contract.
    #[derive(Debug)]
    struct Countdown {
        max_count: u32,
        counter: u32,
    }

    impl Behaviour for Countdown {
        fn reset(&mut self, _ctx: &mut dyn ExecContext) {
            self.counter = self.max_count;
        }

        fn step(&mut self, ctx: &mut dyn ExecContext) -> Result<(), ExecError> {
            if self.is_finished() {
                return Err(ExecError::AlreadyFinished);
            }
            ctx.report(&format!("tick {}", self.counter));
            self.counter -= 1;
            Ok(())
        }

        fn is_finished(&self) -> bool {
            self.counter == 0
        }

        fn state(&self) -> BehaviourState {
            if self.counter == 0 {
                BehaviourState::Finished
            } else if self.counter == self.max_count {
                BehaviourState::Idle
            } else {
                BehaviourState::Running
            }
        }
    }

    #[test]
    fn test_driver_resets_first() {
        let mut bhv = Countdown { max_count: 3, counter: 0 };
        let mut clock = SimClock::new();

        assert_eq!(run_behaviour(&mut bhv, &mut clock).unwrap(), 3);
        assert_eq!(bhv.state(), BehaviourState::Finished);
        assert_eq!(clock.reports().len(), 3);

        // A finished behaviour runs again after the driver's reset
        assert_eq!(run_behaviour(&mut bhv, &mut clock).unwrap(), 3);
    }

    #[test]
    fn test_request_participants() {
        let a = BehaviourRequest::new("ex:r1", "ex:c1", "ex:tA", "ex:tB");
        let b = a.clone().with_max_count(2);
        let c = BehaviourRequest::new("ex:r2", "ex:c1", "ex:tA", "ex:tB");
        assert!(a.same_participants(&b));
        assert!(!a.same_participants(&c));
    }
}
