//! Reachability Validator
//!
//! Breadth-first search over the real simulator. It certifies whether a
//! task goal is reachable at a tolerance within a step budget, which
//! separates "the planner failed" from "the goal cannot be met".
//!
//! The visited set uses a coarser grid than the planner: half units for
//! position and velocity, multiples of five degrees for temperature. The
//! two searches do not certify identical sets; this one is the reference.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use physis_common::{Action, Phase, Result, Simulator, State, TaskId};

/// Validator-resolution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Discretized {
    x2: i64,
    y2: i64,
    vx2: i64,
    vy2: i64,
    temp5: i64,
    phase: Phase,
}

impl From<&State> for Discretized {
    fn from(s: &State) -> Self {
        let halves = |v: f64| (v * 2.0).round_ties_even() as i64;
        Self {
            x2: halves(s.x),
            y2: halves(s.y),
            vx2: halves(s.vx),
            vy2: halves(s.vy),
            temp5: (s.temp / 5.0).round_ties_even() as i64,
            phase: s.phase,
        }
    }
}

/// Result of a reachability search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReachabilityOutcome {
    /// The goal was reached; `witness` replays to it from the task start
    Reachable { witness: Vec<Action>, expansions: usize },
    /// Every state within the step budget was explored without success
    Unreachable { expansions: usize },
    /// The expansion budget ran out first; nothing is proven
    BudgetExhausted { expansions: usize },
}

impl ReachabilityOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ReachabilityOutcome::Reachable { .. })
    }

    pub fn expansions(&self) -> usize {
        match self {
            ReachabilityOutcome::Reachable { expansions, .. }
            | ReachabilityOutcome::Unreachable { expansions }
            | ReachabilityOutcome::BudgetExhausted { expansions } => *expansions,
        }
    }

    /// Flatten into `(reachable, witness, expansions)`
    ///
    /// Budget exhaustion collapses to non-reachable with an empty witness.
    pub fn into_tuple(self) -> (bool, Vec<Action>, usize) {
        match self {
            ReachabilityOutcome::Reachable { witness, expansions } => (true, witness, expansions),
            ReachabilityOutcome::Unreachable { expansions }
            | ReachabilityOutcome::BudgetExhausted { expansions } => (false, Vec::new(), expansions),
        }
    }
}

/// Correctness oracle over a ground-truth simulator
#[derive(Debug, Clone)]
pub struct ReachabilityValidator<S> {
    world: S,
}

impl<S: Simulator> ReachabilityValidator<S> {
    pub fn new(world: S) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &S {
        &self.world
    }

    /// Breadth-first search from the task start
    ///
    /// `tolerance` defaults to the goal's own. Expanding a state counts
    /// against `max_expansions`; paths never exceed `max_steps` actions.
    pub fn check(
        &self,
        task_id: TaskId,
        max_steps: usize,
        tolerance: Option<f64>,
        max_expansions: usize,
    ) -> Result<ReachabilityOutcome> {
        let initial = self.world.reset(task_id)?;
        let goal = self.world.goal(task_id)?;
        let tolerance = tolerance.unwrap_or(goal.tolerance);

        let mut queue: VecDeque<(State, Vec<Action>)> = VecDeque::new();
        let mut visited: HashSet<Discretized> = HashSet::new();
        visited.insert(Discretized::from(&initial));
        queue.push_back((initial, Vec::new()));

        let mut expansions = 0;
        while expansions < max_expansions {
            let Some((state, path)) = queue.pop_front() else {
                debug!(task = %task_id, tolerance, expansions, "Reachable set exhausted");
                return Ok(ReachabilityOutcome::Unreachable { expansions });
            };
            expansions += 1;

            if goal.is_satisfied_within(&state, tolerance) {
                info!(task = %task_id, tolerance, expansions, len = path.len(), "Goal reachable");
                return Ok(ReachabilityOutcome::Reachable {
                    witness: path,
                    expansions,
                });
            }

            if path.len() >= max_steps {
                continue;
            }

            for action in Action::ALL {
                let next = self.world.step(&state, action);
                if visited.insert(Discretized::from(&next)) {
                    let mut next_path = path.clone();
                    next_path.push(action);
                    queue.push_back((next, next_path));
                }
            }
        }

        if queue.is_empty() {
            return Ok(ReachabilityOutcome::Unreachable { expansions });
        }
        warn!(task = %task_id, tolerance, expansions, frontier = queue.len(), "Reachability budget exhausted");
        Ok(ReachabilityOutcome::BudgetExhausted { expansions })
    }

    /// Tuple form of [`check`](Self::check)
    pub fn reachability_check(
        &self,
        task_id: TaskId,
        max_steps: usize,
        tolerance: Option<f64>,
        max_expansions: usize,
    ) -> Result<(bool, Vec<Action>, usize)> {
        Ok(self.check(task_id, max_steps, tolerance, max_expansions)?.into_tuple())
    }

    /// Replay a plan through the simulator from the task start
    ///
    /// True if the final state satisfies the goal at `tolerance`, or the
    /// goal's own tolerance when not given.
    pub fn audit_plan(&self, task_id: TaskId, plan: &[Action], tolerance: Option<f64>) -> Result<bool> {
        let start = self.world.reset(task_id)?;
        let end = plan.iter().fold(start, |s, &a| self.world.step(&s, a));
        self.world.goal_achieved(&end, task_id, tolerance)
    }
}
