//! Causal Hypothesis Engine
//!
//! When a transition surprises the model, the engine proposes candidate
//! laws, tests each one in isolation against ground truth, and selects the
//! single best explanation.
//!
//! The algorithm:
//! 1. Skip every template already covered by a stored rule
//! 2. Expand the remaining templates' parameter grids, capped per round
//! 3. Mentally simulate each candidate alone: action → candidate → integrate
//! 4. Accept the best candidate only if `surprise - error > surprise * 0.2`

use tracing::{debug, info};

use physis_common::{prediction_error, Action, Phase, Rule, Simulator, State};

use crate::config::LearningSettings;
use crate::infra::rule_store::RuleStore;

/// A rule family with its own sampling grid
#[derive(Debug, Clone)]
pub struct HypothesisTemplate {
    pub name: &'static str,
    pub candidates: Vec<Rule>,
}

impl HypothesisTemplate {
    /// A template is covered once any stored rule matches one of its candidates
    pub fn is_covered_by(&self, rules: &RuleStore) -> bool {
        self.candidates.iter().any(|c| rules.contains_match(c))
    }
}

/// The default template set: one per rule family
pub fn default_templates() -> Vec<HypothesisTemplate> {
    let transition = |new_state: Phase| {
        [30.0, 40.0, 50.0, 60.0]
            .into_iter()
            .map(|threshold| Rule::StateTransition { threshold, new_state })
            .collect()
    };

    vec![
        HypothesisTemplate {
            name: "gravity",
            candidates: [0.1, 0.2, 0.3, 0.4, 0.5]
                .into_iter()
                .map(|value| Rule::Gravity { value })
                .collect(),
        },
        HypothesisTemplate {
            name: "friction",
            candidates: [0.8, 0.85, 0.9, 0.95, 0.99]
                .into_iter()
                .map(|value| Rule::Friction { value })
                .collect(),
        },
        HypothesisTemplate {
            name: "melt",
            candidates: transition(Phase::Liquid),
        },
        HypothesisTemplate {
            name: "vaporize",
            candidates: transition(Phase::Gas),
        },
    ]
}

/// A tested candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHypothesis {
    pub rule: Rule,
    /// Prediction error of the candidate in isolation
    pub error: f64,
    /// `surprise - error`
    pub gain: f64,
}

/// Proposes, tests and selects candidate rules
#[derive(Debug, Clone)]
pub struct HypothesisEngine {
    templates: Vec<HypothesisTemplate>,
    max_hypotheses: usize,
    acceptance_ratio: f64,
}

impl HypothesisEngine {
    pub fn new(settings: &LearningSettings) -> Self {
        Self::with_templates(default_templates(), settings)
    }

    pub fn with_templates(templates: Vec<HypothesisTemplate>, settings: &LearningSettings) -> Self {
        Self {
            templates,
            max_hypotheses: settings.max_hypotheses,
            acceptance_ratio: settings.acceptance_ratio,
        }
    }

    /// Lazily yield candidate rules for a surprising transition
    ///
    /// Templates covered by `rules` are skipped entirely. At most
    /// `max_hypotheses` candidates are produced.
    pub fn generate_hypotheses<'a>(
        &'a self,
        rules: &'a RuleStore,
        state: &State,
        action: Action,
        surprise: f64,
    ) -> impl Iterator<Item = Rule> + 'a {
        debug!(action = %action, phase = %state.phase, surprise, "Generating hypotheses");
        self.templates
            .iter()
            .filter(move |t| !t.is_covered_by(rules))
            .flat_map(|t| t.candidates.iter().copied())
            .take(self.max_hypotheses)
    }

    /// Error of a single candidate rule against ground truth
    ///
    /// Only the candidate is applied, never the stored rule set, so the
    /// result measures the candidate's own explanatory power.
    pub fn test_hypothesis<S: Simulator + ?Sized>(
        &self,
        hypothesis: &Rule,
        state: &State,
        action: Action,
        world: &S,
    ) -> f64 {
        let mental = hypothesis.apply(action.apply(*state)).integrate();
        let actual = world.step(state, action);
        prediction_error(&mental, &actual)
    }

    /// Whether a candidate's gain clears the acceptance threshold
    pub fn accepts(&self, surprise: f64, gain: f64) -> bool {
        gain > surprise * self.acceptance_ratio
    }

    /// Generate, test and select the best explanation for a surprise
    ///
    /// Returns the first candidate with the largest positive gain, if that
    /// gain clears the acceptance threshold.
    pub fn investigate<S: Simulator + ?Sized>(
        &self,
        rules: &RuleStore,
        state: &State,
        action: Action,
        surprise: f64,
        world: &S,
    ) -> Option<ScoredHypothesis> {
        let mut best: Option<ScoredHypothesis> = None;

        for rule in self.generate_hypotheses(rules, state, action, surprise) {
            let error = self.test_hypothesis(&rule, state, action, world);
            let gain = surprise - error;
            let best_gain = best.map_or(0.0, |b| b.gain);
            if gain > best_gain {
                best = Some(ScoredHypothesis { rule, error, gain });
            }
        }

        match best {
            Some(b) if self.accepts(surprise, b.gain) => {
                info!(rule = %b.rule, gain = b.gain, surprise, "Hypothesis accepted");
                Some(b)
            }
            Some(b) => {
                debug!(rule = %b.rule, gain = b.gain, surprise, "Best hypothesis below threshold");
                None
            }
            None => None,
        }
    }
}

impl Default for HypothesisEngine {
    fn default() -> Self {
        Self::new(&LearningSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physis_world::PhysicsWorld;
    use proptest::prelude::*;

    fn start() -> State {
        State::new(0.0, 10.0, 25.0)
    }

    #[test]
    fn test_generation_is_capped() {
        let engine = HypothesisEngine::default();
        let rules = RuleStore::new();
        let candidates: Vec<Rule> = engine
            .generate_hypotheses(&rules, &start(), Action::Wait, 1.0)
            .collect();
        assert_eq!(candidates.len(), 15);
        assert_eq!(candidates[0], Rule::Gravity { value: 0.1 });
        assert!(candidates.contains(&Rule::Friction { value: 0.95 }));
    }

    #[test]
    fn test_covered_templates_are_skipped() {
        let engine = HypothesisEngine::default();
        let mut rules = RuleStore::new();
        rules.store_rule(Rule::Gravity { value: 0.3 });

        let candidates: Vec<Rule> = engine
            .generate_hypotheses(&rules, &start(), Action::Wait, 1.0)
            .collect();
        assert!(candidates.iter().all(|r| !matches!(r, Rule::Gravity { .. })));
        assert_eq!(candidates.len(), 13);
    }

    #[test]
    fn test_candidate_is_tested_in_isolation() {
        let engine = HypothesisEngine::default();
        let world = PhysicsWorld::new();
        let s = start();

        let gravity = engine.test_hypothesis(&Rule::Gravity { value: 0.3 }, &s, Action::Wait, &world);
        let friction = engine.test_hypothesis(&Rule::Friction { value: 0.95 }, &s, Action::Wait, &world);
        assert!((gravity - 0.03).abs() < 1e-9);
        assert!((friction - 0.57).abs() < 1e-9);
    }

    #[test]
    fn test_investigate_finds_gravity_from_rest() {
        let engine = HypothesisEngine::default();
        let world = PhysicsWorld::new();
        let rules = RuleStore::new();
        let s = start();

        let best = engine
            .investigate(&rules, &s, Action::Wait, 0.57, &world)
            .expect("gravity explains a fall from rest");
        assert_eq!(best.rule, Rule::Gravity { value: 0.3 });
        assert!(best.gain > 0.5);
    }

    #[test]
    fn test_investigate_rejects_noise_level_gain() {
        let engine = HypothesisEngine::default();
        let world = PhysicsWorld::new();
        let rules = RuleStore::new();

        // A tiny surprise cannot be explained better than by 20%
        assert!(engine.investigate(&rules, &start(), Action::Wait, 0.02, &world).is_none());
    }

    #[test]
    fn test_acceptance_boundary() {
        let engine = HypothesisEngine::default();
        assert!(engine.accepts(1.0, 0.21));
        assert!(!engine.accepts(1.0, 0.2));
        assert!(!engine.accepts(1.0, 0.19));
    }

    proptest! {
        #[test]
        fn prop_acceptance_threshold(surprise in 0.01..100.0f64, frac in 0.0..1.0f64) {
            let engine = HypothesisEngine::default();
            let error = surprise * frac;
            let gain = surprise - error;
            prop_assert_eq!(engine.accepts(surprise, gain), gain > 0.2 * surprise);
            // Straddle the boundary
            prop_assert!(engine.accepts(surprise, surprise * 0.2 * 1.001));
            prop_assert!(!engine.accepts(surprise, surprise * 0.2 * 0.999));
        }
    }
}
