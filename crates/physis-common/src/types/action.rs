//! Action - the closed set of controls the agent can apply

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::state::State;
use crate::error::PhysisError;

/// Horizontal velocity change of a push
pub const PUSH_IMPULSE: f64 = 1.0;

/// Temperature change of heat / cool
pub const HEAT_DELTA: f64 = 15.0;

/// One of the five controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    PushRight,
    PushLeft,
    Heat,
    Cool,
    Wait,
}

impl Action {
    /// Every action, in expansion order
    ///
    /// Search order is significant: planners and validators expand actions
    /// in exactly this sequence.
    pub const ALL: [Action; 5] = [
        Action::PushRight,
        Action::PushLeft,
        Action::Heat,
        Action::Cool,
        Action::Wait,
    ];

    /// Wire symbol of the action
    pub fn as_str(self) -> &'static str {
        match self {
            Action::PushRight => "push_right",
            Action::PushLeft => "push_left",
            Action::Heat => "heat",
            Action::Cool => "cool",
            Action::Wait => "wait",
        }
    }

    /// Apply the action's direct effect, before any physics
    pub fn apply(self, mut state: State) -> State {
        match self {
            Action::PushRight => state.vx += PUSH_IMPULSE,
            Action::PushLeft => state.vx -= PUSH_IMPULSE,
            Action::Heat => state.temp += HEAT_DELTA,
            Action::Cool => state.temp -= HEAT_DELTA,
            Action::Wait => {}
        }
        state
    }
}

impl FromStr for Action {
    type Err = PhysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| PhysisError::InvalidAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_symbols() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_symbol() {
        let err = "jump".parse::<Action>().unwrap_err();
        assert!(matches!(err, PhysisError::InvalidAction(s) if s == "jump"));
    }

    #[test]
    fn test_direct_effects() {
        let s = State::new(0.0, 10.0, 25.0);
        assert_eq!(Action::PushRight.apply(s).vx, 1.0);
        assert_eq!(Action::PushLeft.apply(s).vx, -1.0);
        assert_eq!(Action::Heat.apply(s).temp, 40.0);
        assert_eq!(Action::Cool.apply(s).temp, 10.0);
        assert_eq!(Action::Wait.apply(s), s);
    }
}
