//! Predictive Model
//!
//! Learned forward model: applies an action's direct effect, then every
//! accepted rule in insertion order, then integrates position.
//!
//! Predictions are memoized on a fingerprint of the state rounded to one
//! decimal place plus the action. Confidence comes from a rolling window of
//! absolute prediction errors:
//!
//! ```text
//! confidence = clamp(1 / (1 + mean_recent_error), 0.05, 0.95)
//! ```

use std::collections::HashMap;

use tracing::debug;

use physis_common::{prediction_error, Action, Phase, ProposedRule, RingBuffer, State};

use crate::config::ModelSettings;
use crate::infra::rule_store::RuleStore;

/// Predicted next state with the model's confidence in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub state: State,
    /// Always within the configured clamp, [0.05, 0.95] by default
    pub confidence: f64,
}

/// Memoization key: state fields at one-decimal resolution plus the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PredictionKey {
    x: i64,
    y: i64,
    vx: i64,
    vy: i64,
    temp: i64,
    phase: Phase,
    action: Action,
}

impl PredictionKey {
    fn new(state: &State, action: Action) -> Self {
        let deci = |v: f64| (v * 10.0).round_ties_even() as i64;
        Self {
            x: deci(state.x),
            y: deci(state.y),
            vx: deci(state.vx),
            vy: deci(state.vy),
            temp: deci(state.temp),
            phase: state.phase,
            action,
        }
    }
}

/// Forward model over the accepted rule set
#[derive(Debug, Clone)]
pub struct PredictiveModel {
    rules: RuleStore,
    cache: HashMap<PredictionKey, Prediction>,
    recent_errors: RingBuffer<f64>,
    settings: ModelSettings,
}

impl PredictiveModel {
    pub fn new(settings: ModelSettings) -> Self {
        Self::with_rules(RuleStore::new(), settings)
    }

    /// Model over an existing rule set
    pub fn with_rules(rules: RuleStore, settings: ModelSettings) -> Self {
        Self {
            rules,
            cache: HashMap::new(),
            recent_errors: RingBuffer::new(settings.error_window),
            settings,
        }
    }

    /// Predict the next state for `(state, action)`
    ///
    /// Identical fingerprints return the cached prediction until the cache is
    /// invalidated.
    pub fn predict(&mut self, state: &State, action: Action) -> Prediction {
        let key = PredictionKey::new(state, action);
        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let predicted = self.rules.apply_all(action.apply(*state)).integrate();
        let prediction = Prediction {
            state: predicted,
            confidence: self.confidence(),
        };
        self.cache.insert(key, prediction);
        prediction
    }

    /// Compare a prediction against an observed transition
    ///
    /// Invalidates the whole cache, records the error in the rolling window
    /// and returns it. This is the surprise signal for hypothesis testing and
    /// failure diagnosis.
    pub fn update_from_experience(&mut self, state: &State, action: Action, next_state: &State) -> f64 {
        let predicted = self.predict(state, action);
        self.invalidate_cache();

        let error = prediction_error(&predicted.state, next_state);
        self.recent_errors.push(error);
        debug!(action = %action, error, window = self.recent_errors.len(), "Model updated");
        error
    }

    /// Store a rule; on acceptance the cache is invalidated
    pub fn learn_rule(&mut self, rule: impl Into<ProposedRule>) -> bool {
        let accepted = self.rules.store_rule(rule);
        if accepted {
            self.invalidate_cache();
        }
        accepted
    }

    /// Current confidence from the rolling error window
    pub fn confidence(&self) -> f64 {
        match self.recent_errors.mean() {
            None => self.settings.initial_confidence,
            Some(mean) => (1.0 / (1.0 + mean))
                .clamp(self.settings.min_confidence, self.settings.max_confidence),
        }
    }

    /// Mean of the recent errors, `None` before any observation
    pub fn mean_error(&self) -> Option<f64> {
        self.recent_errors.mean()
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_predictions(&self) -> usize {
        self.cache.len()
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }
}

impl Default for PredictiveModel {
    fn default() -> Self {
        Self::new(ModelSettings::default())
    }
}
