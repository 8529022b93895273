//! Pick-and-place behaviour: a counter-bounded mock of an agent moving
//! objects between workspaces.

use crate::behaviour::{Behaviour, BehaviourRequest, BehaviourState};
use crate::error::ExecError;
use bdd_core::{parse_str_param, ParticipantSet};
use bdd_env::{ExecContext, NamespaceManager};
use std::time::Duration;

/// Module name under which the behaviour is registered.
pub const PICKPLACE_MODULE: &str = "bdd_sim.pickplace";

/// Attribute name under which the behaviour is registered.
pub const PICKPLACE_ATTRIBUTE: &str = "PickPlaceBehaviour";

/// Each step reports a pick then a place, pausing after both.
#[derive(Debug, Clone)]
pub struct PickPlaceBehaviour {
    max_count: u32,
    counter: u32,
    delay: Duration,

    agents: ParticipantSet,
    objects: ParticipantSet,
    pick_ws: ParticipantSet,
    place_ws: ParticipantSet,

    /// Compact renderings used in report lines
    agn_str: String,
    obj_str: String,
    pick_ws_str: String,
    place_ws_str: String,
}

impl PickPlaceBehaviour {
    pub const DEFAULT_MAX_COUNT: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

    /// Parses the participant parameters and builds an idle behaviour.
    ///
    /// # Errors
    /// * `InvalidMaxCount` - `max_count` is zero
    /// * `Model` - a participant parameter does not parse
    pub fn new(request: &BehaviourRequest, ns: &NamespaceManager) -> Result<Self, ExecError> {
        let max_count = request.max_count.unwrap_or(Self::DEFAULT_MAX_COUNT);
        if max_count == 0 {
            return Err(ExecError::InvalidMaxCount);
        }

        let agents = parse_str_param(&request.agent, ns)?;
        let objects = parse_str_param(&request.object, ns)?;
        let pick_ws = parse_str_param(&request.pick_ws, ns)?;
        let place_ws = parse_str_param(&request.place_ws, ns)?;

        Ok(Self {
            max_count,
            counter: max_count,
            delay: request.step_delay.unwrap_or(Self::DEFAULT_DELAY),
            agn_str: join_or(&agents, ns),
            obj_str: join_or(&objects, ns),
            pick_ws_str: join_or(&pick_ws, ns),
            place_ws_str: join_or(&place_ws, ns),
            agents,
            objects,
            pick_ws,
            place_ws,
        })
    }

    /// Factory registered in the behaviour registry.
    pub fn build(request: &BehaviourRequest, ns: &NamespaceManager) -> Result<Box<dyn Behaviour>, ExecError> {
        Ok(Box::new(Self::new(request, ns)?))
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Remaining steps.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn agents(&self) -> &ParticipantSet {
        &self.agents
    }

    pub fn objects(&self) -> &ParticipantSet {
        &self.objects
    }

    pub fn pick_workspaces(&self) -> &ParticipantSet {
        &self.pick_ws
    }

    pub fn place_workspaces(&self) -> &ParticipantSet {
        &self.place_ws
    }
}

/// Alternatives are always reported as a disjunction.
fn join_or(set: &ParticipantSet, ns: &NamespaceManager) -> String {
    set.uris()
        .iter()
        .map(|uri| ns.compact(uri))
        .collect::<Vec<_>>()
        .join(" or ")
}

impl Behaviour for PickPlaceBehaviour {
    fn reset(&mut self, _ctx: &mut dyn ExecContext) {
        self.counter = self.max_count;
    }

    fn step(&mut self, ctx: &mut dyn ExecContext) -> Result<(), ExecError> {
        if self.is_finished() {
            return Err(ExecError::AlreadyFinished);
        }

        ctx.report(&format!(
            "'{}' picks '{}' from '{}'",
            self.agn_str, self.obj_str, self.pick_ws_str
        ));
        ctx.sleep(self.delay);
        ctx.report(&format!(
            "'{}' places '{}' at '{}'",
            self.agn_str, self.obj_str, self.place_ws_str
        ));
        ctx.sleep(self.delay);

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::run_behaviour;
    use crate::context::SimClock;
    use proptest::prelude::*;

    fn ns() -> NamespaceManager {
        let mut ns = NamespaceManager::new();
        ns.bind("ex", "https://example.org/");
        ns
    }

    fn request() -> BehaviourRequest {
        BehaviourRequest::new("ex:robot1", "ex:cube1", "ex:tableA", "ex:tableB")
    }

    #[test]
    fn test_default_max_count() {
        let bhv = PickPlaceBehaviour::new(&request(), &ns()).unwrap();
        assert_eq!(bhv.max_count(), 5);
        assert_eq!(bhv.counter(), 5);
        assert_eq!(bhv.state(), BehaviourState::Idle);
    }

    #[test]
    fn test_zero_max_count_rejected() {
        let err = PickPlaceBehaviour::new(&request().with_max_count(0), &ns()).unwrap_err();
        assert!(matches!(err, ExecError::InvalidMaxCount));
    }

    #[test]
    fn test_bad_participant_rejected() {
        let req = BehaviourRequest::new("ex:robot1 or", "ex:cube1", "ex:tableA", "ex:tableB");
        assert!(matches!(PickPlaceBehaviour::new(&req, &ns()), Err(ExecError::Model(_))));
    }

    #[test]
    fn test_two_steps_report_four_lines() {
        let mut bhv = PickPlaceBehaviour::new(&request().with_max_count(2), &ns()).unwrap();
        let mut clock = SimClock::new();

        let steps = run_behaviour(&mut bhv, &mut clock).unwrap();

        assert_eq!(steps, 2);
        assert_eq!(bhv.counter(), 0);
        assert_eq!(
            clock.reports(),
            &[
                "'ex:robot1' picks 'ex:cube1' from 'ex:tableA'".to_string(),
                "'ex:robot1' places 'ex:cube1' at 'ex:tableB'".to_string(),
                "'ex:robot1' picks 'ex:cube1' from 'ex:tableA'".to_string(),
                "'ex:robot1' places 'ex:cube1' at 'ex:tableB'".to_string(),
            ]
        );
        // two half-steps of 50ms per step
        assert_eq!(clock.now(), Duration::from_millis(200));
    }

    #[test]
    fn test_alternatives_joined_with_or() {
        let req = BehaviourRequest::new("ex:robot1 and ex:robot2", "ex:cube1 or ex:cube2", "ex:tableA", "ex:tableB")
            .with_max_count(1);
        let mut bhv = PickPlaceBehaviour::new(&req, &ns()).unwrap();
        let mut clock = SimClock::new();
        run_behaviour(&mut bhv, &mut clock).unwrap();

        assert_eq!(
            clock.reports()[0],
            "'ex:robot1 or ex:robot2' picks 'ex:cube1 or ex:cube2' from 'ex:tableA'"
        );
    }

    #[test]
    fn test_step_when_finished_fails() {
        let mut bhv = PickPlaceBehaviour::new(&request().with_max_count(1), &ns()).unwrap();
        let mut clock = SimClock::new();

        bhv.step(&mut clock).unwrap();
        assert_eq!(bhv.state(), BehaviourState::Finished);
        assert!(matches!(bhv.step(&mut clock), Err(ExecError::AlreadyFinished)));
        assert_eq!(clock.reports().len(), 2);
    }

    #[test]
    fn test_state_transitions() {
        let mut bhv = PickPlaceBehaviour::new(&request().with_max_count(2), &ns()).unwrap();
        let mut clock = SimClock::new();

        assert_eq!(bhv.state(), BehaviourState::Idle);
        bhv.step(&mut clock).unwrap();
        assert_eq!(bhv.state(), BehaviourState::Running);
        bhv.reset(&mut clock);
        assert_eq!(bhv.state(), BehaviourState::Idle);
        assert_eq!(bhv.counter(), 2);
    }

    proptest! {
        #[test]
        fn prop_terminates_after_max_count_steps(max_count in 1u32..40, runs in 1usize..4) {
            let mut bhv = PickPlaceBehaviour::new(&request().with_max_count(max_count), &ns()).unwrap();
            let mut clock = SimClock::new();

            for _ in 0..runs {
                let steps = run_behaviour(&mut bhv, &mut clock).unwrap();
                prop_assert_eq!(steps, max_count as usize);
                prop_assert!(bhv.is_finished());

                bhv.reset(&mut clock);
                prop_assert_eq!(bhv.counter(), max_count);
                prop_assert!(!bhv.is_finished());
            }
            prop_assert_eq!(clock.reports().len(), 2 * max_count as usize * runs);
        }

        #[test]
        fn prop_not_finished_before_max_count_steps(
            (max_count, steps) in (1u32..40).prop_flat_map(|m| (Just(m), 0..m))
        ) {
            let mut bhv = PickPlaceBehaviour::new(&request().with_max_count(max_count), &ns()).unwrap();
            let mut clock = SimClock::new();
            bhv.reset(&mut clock);

            for _ in 0..steps {
                bhv.step(&mut clock).unwrap();
            }
            prop_assert!(!bhv.is_finished());
            prop_assert_eq!(bhv.counter(), max_count - steps);

            for _ in steps..max_count {
                bhv.step(&mut clock).unwrap();
            }
            prop_assert!(bhv.is_finished());
        }
    }
}
