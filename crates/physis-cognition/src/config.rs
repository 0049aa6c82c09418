//! Physis configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Top-level harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysisConfig {
    /// Planner search budgets
    pub planner: PlannerSettings,
    /// Predictive model settings
    pub model: ModelSettings,
    /// Hypothesis, diagnosis and memory settings
    pub learning: LearningSettings,
    /// Reachability validator budgets
    pub validator: ValidatorSettings,
    /// Demo driver settings
    pub demo: DemoSettings,
}

impl PhysisConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Planner settings
        if let Some(v) = env_parse("PHYSIS_PLANNER_MAX_ITERATIONS") {
            cfg.planner.max_iterations = v;
        }
        if let Some(v) = env_parse("PHYSIS_PLANNER_BEAM_WIDTH") {
            cfg.planner.beam_width = v;
        }

        // Learning settings
        if let Some(v) = env_parse("PHYSIS_LEARNING_EPISODE_CAPACITY") {
            cfg.learning.episode_capacity = v;
        }

        // Validator settings
        if let Some(v) = env_parse("PHYSIS_VALIDATOR_MAX_EXPANSIONS") {
            cfg.validator.max_expansions = v;
        }

        // Demo settings
        if let Some(v) = env_parse("PHYSIS_DEMO_EPISODES") {
            cfg.demo.episodes = v;
        }
        if let Some(v) = env_parse("PHYSIS_DEMO_MAX_STEPS") {
            cfg.demo.max_steps = v;
        }
        if let Some(v) = env_parse("PHYSIS_DEMO_TOLERANCE") {
            cfg.demo.evaluation_tolerance = v;
        }

        Ok(cfg)
    }
}

/// Read and parse an environment variable, ignoring unparseable values
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse().ok())
}

/// Planner search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Frontier pops per `plan` call
    pub max_iterations: usize,
    /// Frontier entries kept after each expansion
    pub beam_width: usize,
    /// Cost added when a path revisits a coarsened state
    pub revisit_penalty: f64,
    /// Scale of the `(1 - confidence)` term in the step cost
    pub uncertainty_weight: f64,
    /// Average confidence a stored skill needs to bypass search
    pub skill_confidence: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_iterations: crate::PLAN_ITERATION_BUDGET,
            beam_width: crate::PLAN_BEAM_WIDTH,
            revisit_penalty: 10.0,
            uncertainty_weight: 3.0,
            skill_confidence: 0.7,
        }
    }
}

/// Predictive model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Number of recent absolute errors used for confidence
    pub error_window: usize,
    /// Confidence reported before any error has been observed
    pub initial_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            error_window: crate::ERROR_WINDOW,
            initial_confidence: 0.1,
            min_confidence: 0.05,
            max_confidence: 0.95,
        }
    }
}

/// Hypothesis, diagnosis and memory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSettings {
    /// Candidate rules per hypothesis round
    pub max_hypotheses: usize,
    /// Fraction of the surprise a hypothesis must explain away to be accepted
    pub acceptance_ratio: f64,
    /// Prediction error above which failure diagnosis runs
    pub audit_threshold: f64,
    /// Surprise above which hypotheses are generated regardless of thinking level
    pub surprise_threshold: f64,
    /// Prediction error below which a step counts as a success
    pub success_error: f64,
    pub episode_capacity: usize,
    pub failure_log_capacity: usize,
    /// Confidence samples averaged by the compute controller
    pub confidence_window: usize,
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            max_hypotheses: crate::MAX_HYPOTHESES,
            acceptance_ratio: 0.2,
            audit_threshold: 0.5,
            surprise_threshold: 0.7,
            success_error: 0.5,
            episode_capacity: crate::EPISODE_CAPACITY,
            failure_log_capacity: crate::EPISODE_CAPACITY,
            confidence_window: 10,
        }
    }
}

/// Reachability validator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorSettings {
    pub max_steps: usize,
    pub max_expansions: usize,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            max_steps: crate::DEFAULT_MAX_STEPS,
            max_expansions: crate::DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Demo driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSettings {
    /// Learning-phase episodes
    pub episodes: usize,
    /// Steps per episode
    pub max_steps: usize,
    /// Tolerance used to score the landing task
    pub evaluation_tolerance: f64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            episodes: 50,
            max_steps: crate::DEFAULT_MAX_STEPS,
            evaluation_tolerance: 0.55,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let cfg = PhysisConfig::default();
        assert_eq!(cfg.planner.max_iterations, 2000);
        assert_eq!(cfg.planner.beam_width, 100);
        assert_eq!(cfg.model.error_window, 50);
        assert_eq!(cfg.learning.max_hypotheses, 15);
        assert_eq!(cfg.learning.episode_capacity, 1000);
        assert_eq!(cfg.validator.max_expansions, 250_000);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg = PhysisConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PhysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.demo.evaluation_tolerance, 0.55);
    }
}
