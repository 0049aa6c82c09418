//! Physis domain logic
//!
//! Prediction, hypothesis testing, diagnosis, planning and reachability.

pub mod controller;
pub mod diagnosis;
pub mod hypothesis;
pub mod memory;
pub mod model;
pub mod planner;
pub mod reachability;
