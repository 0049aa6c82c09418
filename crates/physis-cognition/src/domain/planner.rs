//! Uncertainty-Aware Planner
//!
//! Anytime best-first search over the learned model. Uncertain transitions
//! cost more, so plans drift toward well-modeled paths.
//!
//! ## Key Concepts
//!
//! - **Skill shortcut**: a stored skill for the goal's task is replayed
//!   mentally first and returned without search if it reaches the goal
//!   with enough confidence.
//! - **Step cost**: `1 + (1 - confidence) * 3`.
//! - **Cycle penalty**: revisiting a coarsened state on the same path adds
//!   a fixed cost instead of pruning the branch.
//! - **Beam**: after each expansion the frontier keeps its 100 cheapest
//!   entries.

use std::collections::HashSet;
use std::rc::Rc;

use ordered_float::OrderedFloat;
use tracing::debug;

use physis_common::{Action, Goal, Phase, State};

use crate::config::PlannerSettings;
use crate::domain::model::PredictiveModel;
use crate::infra::episode_store::SkillLibrary;

/// Planner-resolution state: integer position, half-unit velocity, tens of degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoarseState {
    x: i64,
    y: i64,
    vx2: i64,
    vy2: i64,
    temp10: i64,
    phase: Phase,
}

impl From<&State> for CoarseState {
    fn from(s: &State) -> Self {
        Self {
            x: s.x.round_ties_even() as i64,
            y: s.y.round_ties_even() as i64,
            vx2: (s.vx * 2.0).round_ties_even() as i64,
            vy2: (s.vy * 2.0).round_ties_even() as i64,
            temp10: (s.temp / 10.0).round_ties_even() as i64,
            phase: s.phase,
        }
    }
}

/// Frontier entry
#[derive(Debug, Clone)]
struct Node {
    state: State,
    plan: Vec<Action>,
    cost: f64,
    /// Coarsened states on this path; shared between siblings until one adds to it
    visited: Rc<HashSet<CoarseState>>,
}

/// Best-first planner over a [`PredictiveModel`]
#[derive(Debug, Clone, Default)]
pub struct Planner {
    settings: PlannerSettings,
}

impl Planner {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    /// Plan a sequence of at most `max_depth` actions toward `goal`
    ///
    /// Returns the cheapest goal-reaching plan found within the iteration
    /// budget, or an empty plan. An empty plan is a normal outcome.
    pub fn plan(
        &self,
        model: &mut PredictiveModel,
        skills: &SkillLibrary,
        state: &State,
        goal: &Goal,
        max_depth: usize,
    ) -> Vec<Action> {
        if let Some(skill) = goal.task_id.and_then(|task| skills.skill(task)) {
            if !skill.is_empty() {
                let (final_state, confidence) = self.simulate(model, state, &skill);
                if goal.is_satisfied_by(&final_state) && confidence > self.settings.skill_confidence {
                    debug!(len = skill.len(), confidence, "Stored skill reused");
                    return skill;
                }
            }
        }

        let mut best: Option<(f64, Vec<Action>)> = None;
        let mut frontier = vec![Node {
            state: *state,
            plan: Vec::new(),
            cost: 0.0,
            visited: Rc::new(HashSet::new()),
        }];

        for _ in 0..self.settings.max_iterations {
            if frontier.is_empty() {
                break;
            }
            let Node {
                state: current,
                plan,
                mut cost,
                mut visited,
            } = frontier.remove(0);

            let coarse = CoarseState::from(&current);
            if visited.contains(&coarse) {
                cost += self.settings.revisit_penalty;
            } else {
                let mut extended = (*visited).clone();
                extended.insert(coarse);
                visited = Rc::new(extended);
            }

            if goal.is_satisfied_by(&current) {
                if best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
                    best = Some((cost, plan));
                }
                continue;
            }

            if plan.len() >= max_depth {
                continue;
            }

            for action in Action::ALL {
                let prediction = model.predict(&current, action);
                let step_cost = 1.0 + (1.0 - prediction.confidence) * self.settings.uncertainty_weight;
                let mut next_plan = plan.clone();
                next_plan.push(action);
                frontier.push(Node {
                    state: prediction.state,
                    plan: next_plan,
                    cost: cost + step_cost,
                    visited: Rc::clone(&visited),
                });
            }

            frontier.sort_by_key(|node| OrderedFloat(node.cost));
            frontier.truncate(self.settings.beam_width);
        }

        match best {
            Some((cost, plan)) => {
                debug!(len = plan.len(), cost, max_depth, "Plan found");
                plan
            }
            None => {
                debug!(max_depth, "No plan found");
                Vec::new()
            }
        }
    }

    /// Roll an action sequence through the model
    ///
    /// Returns the final predicted state and the average confidence, which
    /// is 0.0 for an empty sequence. The real simulator is never touched.
    pub fn simulate(&self, model: &mut PredictiveModel, state: &State, actions: &[Action]) -> (State, f64) {
        let mut current = *state;
        let mut total_confidence = 0.0;

        for &action in actions {
            let prediction = model.predict(&current, action);
            current = prediction.state;
            total_confidence += prediction.confidence;
        }

        if actions.is_empty() {
            (current, 0.0)
        } else {
            (current, total_confidence / actions.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physis_common::{Rule, Simulator};
    use physis_world::{PhysicsWorld, LAND_TASK, VAPORIZE_TASK};

    fn informed_model() -> PredictiveModel {
        let mut model = PredictiveModel::default();
        model.learn_rule(Rule::Gravity { value: 0.3 });
        model.learn_rule(Rule::Friction { value: 0.95 });
        model
    }

    fn replay(world: &PhysicsWorld, start: State, plan: &[Action]) -> State {
        plan.iter().fold(start, |s, &a| world.step(&s, a))
    }

    #[test]
    fn test_plan_reaches_landing_goal() {
        let world = PhysicsWorld::new();
        let planner = Planner::default();
        let mut model = informed_model();
        let start = world.reset(LAND_TASK).unwrap();
        let goal = world.goal(LAND_TASK).unwrap();

        let plan = planner.plan(&mut model, &SkillLibrary::new(), &start, &goal, 10);
        assert_eq!(
            plan,
            vec![
                Action::PushLeft,
                Action::PushRight,
                Action::PushRight,
                Action::PushRight,
                Action::PushRight,
                Action::PushRight,
            ]
        );
        let end = replay(&world, start, &plan);
        assert!(world.goal_achieved(&end, LAND_TASK, Some(0.55)).unwrap());
    }

    #[test]
    fn test_shallow_depth_yields_empty_plan() {
        let world = PhysicsWorld::new();
        let planner = Planner::default();
        let mut model = informed_model();
        let start = world.reset(LAND_TASK).unwrap();
        let goal = world.goal(LAND_TASK).unwrap();

        assert!(planner.plan(&mut model, &SkillLibrary::new(), &start, &goal, 5).is_empty());
    }

    #[test]
    fn test_unmodeled_phase_change_yields_empty_plan() {
        let world = PhysicsWorld::new();
        let planner = Planner::default();
        let mut model = informed_model();
        let start = world.reset(VAPORIZE_TASK).unwrap();
        let goal = world.goal(VAPORIZE_TASK).unwrap();

        assert!(planner.plan(&mut model, &SkillLibrary::new(), &start, &goal, 15).is_empty());
    }

    #[test]
    fn test_satisfied_start_yields_empty_plan() {
        let planner = Planner::default();
        let mut model = PredictiveModel::default();
        let start = State::new(8.0, 5.0, 25.0);
        let goal = Goal::new(0.5).with_position(8.0, 5.0);

        assert!(planner.plan(&mut model, &SkillLibrary::new(), &start, &goal, 10).is_empty());
    }

    #[test]
    fn test_confident_skill_bypasses_search() {
        let world = PhysicsWorld::new();
        let planner = Planner::default();
        let mut model = informed_model();
        let start = world.reset(LAND_TASK).unwrap();
        let goal = world.goal(LAND_TASK).unwrap();

        // One perfect observation lifts confidence to the ceiling
        model.update_from_experience(&start, Action::Wait, &world.step(&start, Action::Wait));
        assert_eq!(model.confidence(), 0.95);

        let skill = [Action::PushLeft]
            .into_iter()
            .chain(std::iter::repeat(Action::PushRight).take(5))
            .collect::<Vec<_>>();
        let mut skills = SkillLibrary::new();
        skills.store_skill(LAND_TASK, &skill);

        // Depth 0 forbids search, so only the shortcut can produce a plan
        assert_eq!(planner.plan(&mut model, &skills, &start, &goal, 0), skill);
    }

    #[test]
    fn test_unconfident_skill_is_not_trusted() {
        let world = PhysicsWorld::new();
        let planner = Planner::default();
        let mut model = informed_model();
        let start = world.reset(LAND_TASK).unwrap();
        let goal = world.goal(LAND_TASK).unwrap();

        let mut skills = SkillLibrary::new();
        skills.store_skill(LAND_TASK, &[Action::PushLeft, Action::PushRight]);
        assert!(planner.plan(&mut model, &skills, &start, &goal, 0).is_empty());
    }

    #[test]
    fn test_simulate_empty_sequence() {
        let planner = Planner::default();
        let mut model = PredictiveModel::default();
        let start = State::new(1.0, 2.0, 3.0);
        assert_eq!(planner.simulate(&mut model, &start, &[]), (start, 0.0));
    }

    #[test]
    fn test_simulate_averages_confidence() {
        let planner = Planner::default();
        let mut model = PredictiveModel::default();
        let start = State::new(0.0, 10.0, 25.0);
        let (end, confidence) = planner.simulate(&mut model, &start, &[Action::PushRight, Action::Wait]);
        assert_eq!(end.x, 2.0);
        assert!((confidence - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_coarsening_resolution() {
        let a = CoarseState::from(&State::new(0.4, 9.6, 24.0).with_velocity(0.2, -0.2));
        let b = CoarseState::from(&State::new(-0.4, 10.4, 21.0).with_velocity(-0.2, 0.2));
        assert_eq!(a, b);
        let c = CoarseState::from(&State::new(0.0, 10.0, 25.0).with_velocity(0.3, 0.0));
        assert_ne!(a, c);
    }
}
