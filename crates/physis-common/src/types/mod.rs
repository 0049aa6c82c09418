//! Core types for the Physis harness

pub mod action;
pub mod goal;
pub mod rule;
pub mod state;
