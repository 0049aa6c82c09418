//! In-process stores for rules, episodes and skills

pub mod episode_store;
pub mod rule_store;
