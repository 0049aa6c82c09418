//! Failure Diagnosis
//!
//! When the model badly mispredicts a transition, the diagnoser names the
//! most likely missing law and proposes a concrete rule for it.
//!
//! ## Cascade
//!
//! Checks run in table order and the first match wins:
//!
//! | # | check                                  | diagnosis                 | rule                          |
//! |---|----------------------------------------|---------------------------|-------------------------------|
//! | 1 | \|Δvx\| > 0.1 or \|Δvy\| > 0.1         | velocity mismatch         | friction 0.95                 |
//! | 2 | \|Δy\| > 0.5                           | vertical prediction error | gravity 0.3                   |
//! | 3 | phase differs                          | state transition          | transition at 50 → observed   |
//! | 4 | otherwise                              | unknown                   | none                          |

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use physis_common::{Action, Goal, RingBuffer, Rule, State};

use crate::config::LearningSettings;

/// Velocity difference above which friction is suspected
pub const VELOCITY_MISMATCH: f64 = 0.1;

/// Vertical position difference above which gravity is suspected
pub const VERTICAL_DRIFT: f64 = 0.5;

/// Diagnosed cause of a misprediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    VelocityMismatch,
    VerticalDrift,
    StateTransition,
    Unknown,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureMode::VelocityMismatch => "velocity mismatch (friction missing)",
            FailureMode::VerticalDrift => "vertical prediction error (gravity missing)",
            FailureMode::StateTransition => "state transition incorrect",
            FailureMode::Unknown => "unknown failure mode",
        };
        f.write_str(label)
    }
}

/// One row of the cascade
struct Check {
    mode: FailureMode,
    matches: fn(predicted: &State, actual: &State) -> bool,
    propose: fn(actual: &State) -> Rule,
}

/// The cascade, in evaluation order
const CASCADE: [Check; 3] = [
    Check {
        mode: FailureMode::VelocityMismatch,
        matches: velocity_mismatch,
        propose: propose_friction,
    },
    Check {
        mode: FailureMode::VerticalDrift,
        matches: vertical_drift,
        propose: propose_gravity,
    },
    Check {
        mode: FailureMode::StateTransition,
        matches: phase_mismatch,
        propose: propose_transition,
    },
];

fn velocity_mismatch(predicted: &State, actual: &State) -> bool {
    (predicted.vx - actual.vx).abs() > VELOCITY_MISMATCH
        || (predicted.vy - actual.vy).abs() > VELOCITY_MISMATCH
}

fn vertical_drift(predicted: &State, actual: &State) -> bool {
    (predicted.y - actual.y).abs() > VERTICAL_DRIFT
}

fn phase_mismatch(predicted: &State, actual: &State) -> bool {
    predicted.phase != actual.phase
}

fn propose_friction(_: &State) -> Rule {
    Rule::Friction { value: 0.95 }
}

fn propose_gravity(_: &State) -> Rule {
    Rule::Gravity { value: 0.3 }
}

/// Transition into whatever phase was actually observed
fn propose_transition(actual: &State) -> Rule {
    Rule::StateTransition {
        threshold: 50.0,
        new_state: actual.phase,
    }
}

/// Logged diagnosis, kept for inspection only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub diagnosis: FailureMode,
    pub state: State,
    pub goal: Option<Goal>,
    pub action: Action,
    pub recorded_at: DateTime<Utc>,
}

/// Names the missing law behind a large prediction error
#[derive(Debug, Clone)]
pub struct FailureDiagnoser {
    history: RingBuffer<FailureRecord>,
    activation_threshold: f64,
}

impl FailureDiagnoser {
    pub fn new(settings: &LearningSettings) -> Self {
        Self {
            history: RingBuffer::new(settings.failure_log_capacity),
            activation_threshold: settings.audit_threshold,
        }
    }

    /// Whether an error is large enough to diagnose
    pub fn should_activate(&self, prediction_error: f64) -> bool {
        prediction_error > self.activation_threshold
    }

    /// Diagnose a misprediction and propose a corrective rule
    ///
    /// Every call is recorded in the failure history, whether or not a rule
    /// is proposed.
    pub fn analyze_failure(
        &mut self,
        state: &State,
        goal: Option<&Goal>,
        actual: &State,
        predicted: &State,
        action: Action,
    ) -> (FailureMode, Option<Rule>) {
        let (mode, rule) = CASCADE
            .iter()
            .find(|check| (check.matches)(predicted, actual))
            .map_or((FailureMode::Unknown, None), |check| {
                (check.mode, Some((check.propose)(actual)))
            });

        self.history.push(FailureRecord {
            diagnosis: mode,
            state: *state,
            goal: goal.copied(),
            action,
            recorded_at: Utc::now(),
        });

        match rule {
            Some(r) => info!(diagnosis = %mode, rule = %r, action = %action, "Failure diagnosed"),
            None => debug!(diagnosis = %mode, action = %action, "Failure not attributable"),
        }

        (mode, rule)
    }

    /// Recorded diagnoses, oldest first
    pub fn history(&self) -> impl Iterator<Item = &FailureRecord> {
        self.history.iter()
    }

    pub fn failures(&self) -> usize {
        self.history.len()
    }
}

impl Default for FailureDiagnoser {
    fn default() -> Self {
        Self::new(&LearningSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physis_common::Phase;

    fn base() -> State {
        State::new(0.0, 10.0, 25.0)
    }

    #[test]
    fn test_velocity_takes_precedence_over_vertical_drift() {
        let mut diagnoser = FailureDiagnoser::default();
        let predicted = base();
        let actual = State { y: 9.0, ..base() }.with_velocity(0.0, -0.3);

        let (mode, rule) = diagnoser.analyze_failure(&base(), None, &actual, &predicted, Action::Wait);
        assert_eq!(mode, FailureMode::VelocityMismatch);
        assert_eq!(rule, Some(Rule::Friction { value: 0.95 }));
    }

    #[test]
    fn test_vertical_drift_proposes_gravity() {
        let mut diagnoser = FailureDiagnoser::default();
        let actual = State { y: 9.3, ..base() };

        let (mode, rule) = diagnoser.analyze_failure(&base(), None, &actual, &base(), Action::Wait);
        assert_eq!(mode, FailureMode::VerticalDrift);
        assert_eq!(rule, Some(Rule::Gravity { value: 0.3 }));
    }

    #[test]
    fn test_phase_mismatch_targets_observed_phase() {
        let mut diagnoser = FailureDiagnoser::default();
        let actual = base().with_phase(Phase::Gas);

        let (mode, rule) = diagnoser.analyze_failure(&base(), None, &actual, &base(), Action::Heat);
        assert_eq!(mode, FailureMode::StateTransition);
        assert_eq!(
            rule,
            Some(Rule::StateTransition {
                threshold: 50.0,
                new_state: Phase::Gas
            })
        );
    }

    #[test]
    fn test_unknown_mode_is_still_logged() {
        let mut diagnoser = FailureDiagnoser::default();
        let actual = State { temp: 40.0, ..base() };
        let goal = Goal::new(0.5).with_phase(Phase::Gas);

        let (mode, rule) =
            diagnoser.analyze_failure(&base(), Some(&goal), &actual, &base(), Action::Heat);
        assert_eq!(mode, FailureMode::Unknown);
        assert!(rule.is_none());
        assert_eq!(diagnoser.failures(), 1);

        let record = diagnoser.history().next().unwrap();
        assert_eq!(record.diagnosis, FailureMode::Unknown);
        assert_eq!(record.goal, Some(goal));
    }

    #[test]
    fn test_activation_gate() {
        let diagnoser = FailureDiagnoser::default();
        assert!(!diagnoser.should_activate(0.5));
        assert!(diagnoser.should_activate(0.51));
    }

    #[test]
    fn test_history_is_bounded() {
        let settings = LearningSettings {
            failure_log_capacity: 2,
            ..LearningSettings::default()
        };
        let mut diagnoser = FailureDiagnoser::new(&settings);
        for _ in 0..5 {
            diagnoser.analyze_failure(&base(), None, &base(), &base(), Action::Wait);
        }
        assert_eq!(diagnoser.failures(), 2);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            FailureMode::VelocityMismatch.to_string(),
            "velocity mismatch (friction missing)"
        );
        assert_eq!(FailureMode::Unknown.to_string(), "unknown failure mode");
    }
}
