//! Rule Storage
//!
//! Accepted causal laws, canonicalized and deduplicated with physics-aware
//! tolerance equality. Application order is insertion order: later rules
//! observe the state already transformed by earlier ones.

use tracing::debug;

use physis_common::{ProposedRule, Rule, State};

/// Ordered set of accepted rules
///
/// Never holds two tolerance-equal rules of the same kind.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize and store a rule
    ///
    /// Returns `false` without changing the store when a tolerance-equal rule
    /// is already present. Provenance is dropped before comparison.
    pub fn store_rule(&mut self, rule: impl Into<ProposedRule>) -> bool {
        let proposed = rule.into();
        let canonical = proposed.rule.canonical();

        if self.contains_match(&canonical) {
            debug!(rule = %canonical, source = ?proposed.source, "Rule rejected as duplicate");
            return false;
        }

        debug!(rule = %canonical, source = ?proposed.source, "Rule stored");
        self.rules.push(canonical);
        true
    }

    /// Copy of the stored rules in application order
    pub fn get_rules(&self) -> Vec<Rule> {
        self.rules.clone()
    }

    /// Borrowing view of the stored rules in application order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Whether any stored rule is tolerance-equal to `rule`
    pub fn contains_match(&self, rule: &Rule) -> bool {
        self.rules.iter().any(|existing| existing.tolerance_eq(rule))
    }

    /// Apply every stored rule in insertion order
    pub fn apply_all(&self, state: State) -> State {
        self.rules.iter().fold(state, |s, rule| rule.apply(s))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
