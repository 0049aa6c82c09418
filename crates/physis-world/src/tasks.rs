//! Task catalogue: initial states and goals

use serde::{Deserialize, Serialize};

use physis_common::{Goal, Phase, State, TaskId};

/// A task definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: TaskId,
    pub initial_state: State,
    /// Goal targets, tolerance included
    pub goal: Goal,
}

/// Reach (8, 5) in the solid phase, starting at rest from (0, 10)
pub const LAND_TASK: TaskId = TaskId(1);

/// Drive the body into the gas phase, starting at rest from (5, 5)
pub const VAPORIZE_TASK: TaskId = TaskId(2);

/// The built-in tasks
pub fn default_tasks() -> Vec<TaskSpec> {
    vec![
        TaskSpec {
            id: LAND_TASK,
            initial_state: State::new(0.0, 10.0, 25.0),
            goal: Goal::new(0.55)
                .with_position(8.0, 5.0)
                .with_phase(Phase::Solid)
                .for_task(LAND_TASK),
        },
        TaskSpec {
            id: VAPORIZE_TASK,
            initial_state: State::new(5.0, 5.0, 25.0),
            goal: Goal::new(0.50).with_phase(Phase::Gas).for_task(VAPORIZE_TASK),
        },
    ]
}
