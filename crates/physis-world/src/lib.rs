//! # Physis World
//!
//! Deterministic toy physics with hidden dynamics. This is the ground truth
//! the agent learns from; nothing in here is learned.
//!
//! ## Step Order
//!
//! ```text
//! action effect → gravity → friction → integrate → phase dynamics → bounds
//! ```
//!
//! ## Phase Dynamics
//!
//! Above the temperature threshold the phase advances 0 → 1 → 2, one stage
//! per step. Below 20° a gas collapses straight back to solid.

pub mod tasks;

use physis_common::{Action, Goal, Phase, PhysisError, Result, Simulator, State, TaskId};

pub use tasks::{default_tasks, TaskSpec, LAND_TASK, VAPORIZE_TASK};

/// Temperature below which a gas collapses back to solid
pub const CONDENSE_TEMPERATURE: f64 = 20.0;

/// Hidden physical constants of the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HiddenDynamics {
    /// Subtracted from vy each step
    pub gravity: f64,
    /// Multiplies vx and vy each step
    pub friction: f64,
    /// Temperature above which the phase advances
    pub temp_threshold: f64,
}

impl Default for HiddenDynamics {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            friction: 0.95,
            temp_threshold: 50.0,
        }
    }
}

/// The simulated world
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    dynamics: HiddenDynamics,
    tasks: Vec<TaskSpec>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_dynamics(HiddenDynamics::default())
    }

    /// World with custom constants and the default tasks
    pub fn with_dynamics(dynamics: HiddenDynamics) -> Self {
        Self {
            dynamics,
            tasks: default_tasks(),
        }
    }

    pub fn dynamics(&self) -> &HiddenDynamics {
        &self.dynamics
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    fn task(&self, task_id: TaskId) -> Result<&TaskSpec> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(PhysisError::UnknownTask(task_id))
    }

    fn advance_phase(&self, mut state: State) -> State {
        if state.temp > self.dynamics.temp_threshold {
            state.phase = match state.phase {
                Phase::Solid => Phase::Liquid,
                Phase::Liquid | Phase::Gas => Phase::Gas,
            };
        } else if state.temp < CONDENSE_TEMPERATURE && state.phase == Phase::Gas {
            state.phase = Phase::Solid;
        }
        state
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for PhysicsWorld {
    fn step(&self, state: &State, action: Action) -> State {
        let mut s = action.apply(*state);

        s.vy -= self.dynamics.gravity;
        s.vx *= self.dynamics.friction;
        s.vy *= self.dynamics.friction;

        let s = self.advance_phase(s.integrate());
        s.clamp_to_bounds()
    }

    fn reset(&self, task_id: TaskId) -> Result<State> {
        Ok(self.task(task_id)?.initial_state)
    }

    fn goal(&self, task_id: TaskId) -> Result<Goal> {
        Ok(self.task(task_id)?.goal)
    }
}
