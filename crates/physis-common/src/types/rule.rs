//! Rule - candidate and accepted causal laws
//!
//! A rule is a tagged variant over the three laws the harness can learn.
//! Rules arrive as [`ProposedRule`]s carrying provenance; storage keeps only
//! the [`Rule::canonical`] form, so two proposals with the same physics but a
//! different origin compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::{Phase, State};

/// Gravity values closer than this are the same law
pub const GRAVITY_TOLERANCE: f64 = 0.05;

/// Friction values closer than this are the same law
pub const FRICTION_TOLERANCE: f64 = 0.01;

/// Transition thresholds closer than this are the same law
pub const THRESHOLD_TOLERANCE: f64 = 5.0;

/// Kind of a rule, without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Gravity,
    Friction,
    StateTransition,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Gravity => "gravity",
            RuleKind::Friction => "friction",
            RuleKind::StateTransition => "state_transition",
        };
        f.write_str(name)
    }
}

/// A causal law over one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Reduces vy by `value` each step
    Gravity { value: f64 },
    /// Multiplies vx and vy by `value` each step
    Friction { value: f64 },
    /// Sets the phase to `new_state` when temp exceeds `threshold`
    StateTransition { threshold: f64, new_state: Phase },
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Gravity { .. } => RuleKind::Gravity,
            Rule::Friction { .. } => RuleKind::Friction,
            Rule::StateTransition { .. } => RuleKind::StateTransition,
        }
    }

    /// Apply the rule to a state, returning the transformed copy
    pub fn apply(&self, mut state: State) -> State {
        match *self {
            Rule::Gravity { value } => state.vy -= value,
            Rule::Friction { value } => {
                state.vx *= value;
                state.vy *= value;
            }
            Rule::StateTransition { threshold, new_state } => {
                if state.temp > threshold {
                    state.phase = new_state;
                }
            }
        }
        state
    }

    /// Round numeric fields to the per-kind storage granularity
    ///
    /// gravity: 0.01, friction: 0.001, transition threshold: 0.1.
    pub fn canonical(&self) -> Rule {
        match *self {
            Rule::Gravity { value } => Rule::Gravity {
                value: round_decimals(value, 2),
            },
            Rule::Friction { value } => Rule::Friction {
                value: round_decimals(value, 3),
            },
            Rule::StateTransition { threshold, new_state } => Rule::StateTransition {
                threshold: round_decimals(threshold, 1),
                new_state,
            },
        }
    }

    /// Physics-aware tolerance equality
    ///
    /// Rules of different kinds are never equal. Transitions additionally
    /// require the same target phase.
    pub fn tolerance_eq(&self, other: &Rule) -> bool {
        match (*self, *other) {
            (Rule::Gravity { value: a }, Rule::Gravity { value: b }) => {
                (a - b).abs() < GRAVITY_TOLERANCE
            }
            (Rule::Friction { value: a }, Rule::Friction { value: b }) => {
                (a - b).abs() < FRICTION_TOLERANCE
            }
            (
                Rule::StateTransition {
                    threshold: a,
                    new_state: sa,
                },
                Rule::StateTransition {
                    threshold: b,
                    new_state: sb,
                },
            ) => (a - b).abs() < THRESHOLD_TOLERANCE && sa == sb,
            _ => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Gravity { value } => write!(f, "gravity: {}", value),
            Rule::Friction { value } => write!(f, "friction: {}", value),
            Rule::StateTransition { threshold, new_state } => {
                write!(f, "state_transition: temp>{} -> state={}", threshold, new_state)
            }
        }
    }
}

/// Where a proposed rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// Accepted from hypothesis testing
    Hypothesis,
    /// Proposed by failure diagnosis
    Audit,
    /// Inserted directly by a caller
    Manual,
}

/// A rule together with its provenance, as submitted for storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProposedRule {
    #[serde(flatten)]
    pub rule: Rule,
    pub source: RuleSource,
}

impl ProposedRule {
    pub fn new(rule: Rule, source: RuleSource) -> Self {
        Self { rule, source }
    }
}

impl From<Rule> for ProposedRule {
    fn from(rule: Rule) -> Self {
        Self::new(rule, RuleSource::Manual)
    }
}

/// Round half to even at a number of decimal places
pub fn round_decimals(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_rounding() {
        assert_eq!(Rule::Gravity { value: 0.30449 }.canonical(), Rule::Gravity { value: 0.3 });
        assert_eq!(
            Rule::Friction { value: 0.95049 }.canonical(),
            Rule::Friction { value: 0.95 }
        );
        assert_eq!(
            Rule::StateTransition {
                threshold: 49.96,
                new_state: Phase::Liquid
            }
            .canonical(),
            Rule::StateTransition {
                threshold: 50.0,
                new_state: Phase::Liquid
            }
        );
    }

    #[test]
    fn test_tolerance_equality() {
        let g = Rule::Gravity { value: 0.3 };
        assert!(g.tolerance_eq(&Rule::Gravity { value: 0.34 }));
        assert!(!g.tolerance_eq(&Rule::Gravity { value: 0.36 }));
        assert!(!g.tolerance_eq(&Rule::Friction { value: 0.3 }));

        let t1 = Rule::StateTransition {
            threshold: 50.0,
            new_state: Phase::Liquid,
        };
        let t2 = Rule::StateTransition {
            threshold: 54.0,
            new_state: Phase::Liquid,
        };
        let t3 = Rule::StateTransition {
            threshold: 50.0,
            new_state: Phase::Gas,
        };
        assert!(t1.tolerance_eq(&t2));
        assert!(!t1.tolerance_eq(&t3));
    }

    #[test]
    fn test_apply_rules() {
        let s = State::new(0.0, 10.0, 60.0).with_velocity(2.0, 1.0);
        assert_eq!(Rule::Gravity { value: 0.3 }.apply(s).vy, 0.7);
        let f = Rule::Friction { value: 0.5 }.apply(s);
        assert_eq!((f.vx, f.vy), (1.0, 0.5));
        let t = Rule::StateTransition {
            threshold: 50.0,
            new_state: Phase::Gas,
        };
        assert_eq!(t.apply(s).phase, Phase::Gas);
        assert_eq!(t.apply(State::new(0.0, 0.0, 25.0)).phase, Phase::Solid);
    }

    #[test]
    fn test_proposed_rule_serializes_with_provenance() {
        let proposed = ProposedRule::new(Rule::Gravity { value: 0.3 }, RuleSource::Audit);
        let json = serde_json::to_value(proposed).unwrap();
        assert_eq!(json["type"], "gravity");
        assert_eq!(json["source"], "audit");
    }

    fn any_phase() -> impl Strategy<Value = Phase> {
        prop_oneof![Just(Phase::Solid), Just(Phase::Liquid), Just(Phase::Gas)]
    }

    fn any_rule() -> impl Strategy<Value = Rule> {
        prop_oneof![
            (0.0..1.0f64).prop_map(|value| Rule::Gravity { value }),
            (0.5..1.0f64).prop_map(|value| Rule::Friction { value }),
            (0.0..100.0f64, any_phase())
                .prop_map(|(threshold, new_state)| Rule::StateTransition { threshold, new_state }),
        ]
    }

    proptest! {
        #[test]
        fn prop_tolerance_eq_is_symmetric(a in any_rule(), b in any_rule()) {
            prop_assert_eq!(a.tolerance_eq(&b), b.tolerance_eq(&a));
        }

        #[test]
        fn prop_canonical_is_idempotent(rule in any_rule()) {
            let once = rule.canonical();
            prop_assert_eq!(once.canonical(), once);
            prop_assert!(once.tolerance_eq(&rule));
        }
    }

    #[test]
    fn test_display() {
        let t = Rule::StateTransition {
            threshold: 50.0,
            new_state: Phase::Liquid,
        };
        assert_eq!(t.to_string(), "state_transition: temp>50 -> state=1");
    }
}
