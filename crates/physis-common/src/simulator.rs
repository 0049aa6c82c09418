//! Simulator - the ground-truth collaborator
//!
//! The learning core never owns the physics. It reads ground truth only
//! through this trait: hypothesis testing steps it once per candidate, and
//! the reachability validator searches over it directly.

use crate::error::Result;
use crate::types::{
    action::Action,
    goal::{Goal, TaskId},
    state::State,
};

/// Deterministic, pure state-transition function plus a task catalogue
pub trait Simulator {
    /// Advance one step. Must be deterministic: equal inputs give equal outputs.
    fn step(&self, state: &State, action: Action) -> State;

    /// Initial state of a task
    fn reset(&self, task_id: TaskId) -> Result<State>;

    /// Goal of a task, with its embedded tolerance and task id
    fn goal(&self, task_id: TaskId) -> Result<Goal>;

    /// Check a task goal, at the goal's own tolerance unless one is given
    fn goal_achieved(&self, state: &State, task_id: TaskId, tolerance: Option<f64>) -> Result<bool> {
        let goal = self.goal(task_id)?;
        let tolerance = tolerance.unwrap_or(goal.tolerance);
        Ok(goal.is_satisfied_within(state, tolerance))
    }

    /// Step with an action given by symbol
    ///
    /// Fails with [`PhysisError::InvalidAction`](crate::PhysisError::InvalidAction)
    /// for anything outside the fixed set.
    fn step_named(&self, state: &State, action: &str) -> Result<State> {
        let action = action.parse::<Action>()?;
        Ok(self.step(state, action))
    }
}

impl<S: Simulator + ?Sized> Simulator for &S {
    fn step(&self, state: &State, action: Action) -> State {
        (**self).step(state, action)
    }

    fn reset(&self, task_id: TaskId) -> Result<State> {
        (**self).reset(task_id)
    }

    fn goal(&self, task_id: TaskId) -> Result<Goal> {
        (**self).goal(task_id)
    }
}
