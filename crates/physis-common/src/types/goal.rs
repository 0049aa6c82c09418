//! Goal - a partial target state with an embedded tolerance
//!
//! Goals carry explicit optional targets instead of an open key/value map,
//! so matching is exhaustive: continuous targets compare within tolerance,
//! the discrete phase compares exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::{Phase, State};

/// Tolerance used when a goal does not specify one
pub const DEFAULT_TOLERANCE: f64 = 0.50;

/// Identifier of a task in the simulator's catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Partial target state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Target position, if the goal constrains it
    pub position: Option<Position>,
    /// Target phase, if the goal constrains it
    pub phase: Option<Phase>,
    /// Maximum absolute deviation for continuous targets
    pub tolerance: f64,
    /// Task this goal originates from
    pub task_id: Option<TaskId>,
}

impl Goal {
    /// Unconstrained goal with the given tolerance
    pub fn new(tolerance: f64) -> Self {
        Self {
            position: None,
            phase: None,
            tolerance,
            task_id: None,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Same targets, different tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check the goal at its embedded tolerance
    pub fn is_satisfied_by(&self, state: &State) -> bool {
        self.is_satisfied_within(state, self.tolerance)
    }

    /// Check the goal at an explicit tolerance
    pub fn is_satisfied_within(&self, state: &State, tolerance: f64) -> bool {
        if let Some(phase) = self.phase {
            if state.phase != phase {
                return false;
            }
        }
        if let Some(target) = self.position {
            if (state.x - target.x).abs() > tolerance || (state.y - target.y).abs() > tolerance {
                return false;
            }
        }
        true
    }
}

impl Default for Goal {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
