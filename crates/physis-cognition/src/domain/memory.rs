//! Episode Types
//!
//! An episode is one observed transition: the state before, the action
//! taken, the state after, and whether the model predicted it well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use physis_common::{Action, State};

/// Immutable record of one observed transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Unique episode identifier
    pub id: Uuid,

    /// State before the action
    pub state: State,

    /// Action taken
    pub action: Action,

    /// State observed after the action
    pub next_state: State,

    /// Whether the prediction error stayed under the success bound
    pub success: bool,

    /// Fingerprint of `state`, used for similarity lookups
    pub fingerprint: String,

    /// When this episode was recorded
    pub recorded_at: DateTime<Utc>,
}

impl Episode {
    /// Create a new episode record
    pub fn new(state: State, action: Action, next_state: State, success: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            fingerprint: state.fingerprint(),
            state,
            action,
            next_state,
            success,
            recorded_at: Utc::now(),
        }
    }
}
