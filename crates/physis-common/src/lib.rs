//! # Physis Common
//!
//! Shared types and errors for the Physis causal-learning harness.
//!
//! ## Core Types
//!
//! - [`State`]: value-type snapshot of the simulated body
//! - [`Action`]: the closed set of five controls
//! - [`Rule`]: gravity / friction / phase-transition laws with tolerance equality
//! - [`Goal`]: partial target state with an embedded tolerance
//! - [`RingBuffer`]: bounded history with oldest-first eviction
//!
//! ## Ground Truth
//!
//! - [`Simulator`]: the deterministic physics the agent learns from

pub mod buffer;
pub mod error;
pub mod simulator;
pub mod types;

// Re-export commonly used types at crate root
pub use buffer::RingBuffer;
pub use error::{PhysisError, Result};
pub use simulator::Simulator;
pub use types::{
    action::Action,
    goal::{Goal, Position, TaskId, DEFAULT_TOLERANCE},
    rule::{ProposedRule, Rule, RuleKind, RuleSource},
    state::{prediction_error, Phase, State},
};

/// Physis version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
