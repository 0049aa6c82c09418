//! # Physis Cognition
//!
//! A small causal learner for a hidden-dynamics physics world. The agent
//! starts knowing nothing about the world's laws and discovers them by
//! proposing candidate rules when its predictions fail, testing each
//! candidate against ground truth, and keeping only the ones that explain
//! away most of the surprise.
//!
//! ## Key Concepts
//!
//! - **Predictive Model**: learned forward model with memoized predictions
//!   and a confidence derived from recent errors
//! - **Hypothesis Engine**: proposes and isolates candidate laws
//! - **Failure Diagnoser**: ordered cascade naming the missing law behind a
//!   large misprediction
//! - **Planner**: uncertainty-aware best-first search over the model
//! - **Reachability Validator**: breadth-first search over the real
//!   simulator, used as a correctness oracle for the planner
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Agent                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐    │
//! │  │   Compute    │  │   Planner    │  │  Hypothesis  │    │
//! │  │  Controller  │  │ (best-first) │  │    Engine    │    │
//! │  └──────────────┘  └──────┬───────┘  └──────┬───────┘    │
//! │                           │                 │            │
//! │  ┌────────────────────────┴──────┐  ┌───────┴───────┐    │
//! │  │        PredictiveModel        │  │   Diagnoser   │    │
//! │  │   (RuleStore + cache + conf)  │  │   (cascade)   │    │
//! │  └───────────────────────────────┘  └───────────────┘    │
//! │  ┌───────────────┐  ┌───────────────┐                    │
//! │  │ EpisodeMemory │  │ SkillLibrary  │                    │
//! │  └───────────────┘  └───────────────┘                    │
//! └──────────────────────────────────────────────────────────┘
//!                   │ Simulator (ground truth)
//!          ┌────────┴─────────┐
//!          │ ReachabilityValidator
//! ```

pub mod agent;
pub mod config;
pub mod domain;
pub mod infra;

// Re-export core types
pub use agent::{heuristic_action, Agent, AgentStats, Decision, EpisodeReport, Lesson};
pub use config::PhysisConfig;
pub use domain::controller::{ComputeController, ThinkingLevel};
pub use domain::diagnosis::{FailureDiagnoser, FailureMode, FailureRecord};
pub use domain::hypothesis::{HypothesisEngine, HypothesisTemplate, ScoredHypothesis};
pub use domain::memory::Episode;
pub use domain::model::{Prediction, PredictiveModel};
pub use domain::planner::Planner;
pub use domain::reachability::{ReachabilityOutcome, ReachabilityValidator};

// Re-export infrastructure
pub use infra::episode_store::{EpisodeMemory, SkillLibrary};
pub use infra::rule_store::RuleStore;

/// Physis version
pub const PHYSIS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frontier pops per planning call
pub const PLAN_ITERATION_BUDGET: usize = 2000;

/// Frontier entries kept after each planner expansion
pub const PLAN_BEAM_WIDTH: usize = 100;

/// Recent prediction errors behind the model's confidence
pub const ERROR_WINDOW: usize = 50;

/// Candidate rules per hypothesis round
pub const MAX_HYPOTHESES: usize = 15;

/// Episodes kept before the oldest is evicted
pub const EPISODE_CAPACITY: usize = 1000;

/// Step budget for episodes and reachability checks
pub const DEFAULT_MAX_STEPS: usize = 30;

/// Expansion budget for reachability checks
pub const DEFAULT_MAX_EXPANSIONS: usize = 250_000;
