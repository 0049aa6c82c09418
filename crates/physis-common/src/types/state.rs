//! State - a single snapshot of the simulated body
//!
//! States are plain `Copy` values. Every transform in the harness takes a
//! state by value and returns a new one, so no two components ever share a
//! mutable snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PhysisError;

/// Horizontal bounds enforced by the simulator
pub const X_BOUNDS: (f64, f64) = (-10.0, 10.0);

/// Vertical bounds enforced by the simulator
pub const Y_BOUNDS: (f64, f64) = (0.0, 20.0);

/// Weight of a discrete phase mismatch in the prediction error
pub const PHASE_ERROR_WEIGHT: f64 = 2.0;

/// Discrete phase of the body
///
/// Serialized as its integer index so snapshots read as `{"state": 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Phase {
    #[default]
    Solid,
    Liquid,
    Gas,
}

impl Phase {
    /// Integer index of the phase (0, 1 or 2)
    pub fn index(self) -> i64 {
        match self {
            Phase::Solid => 0,
            Phase::Liquid => 1,
            Phase::Gas => 2,
        }
    }
}

impl TryFrom<i64> for Phase {
    type Error = PhysisError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Phase::Solid),
            1 => Ok(Phase::Liquid),
            2 => Ok(Phase::Gas),
            other => Err(PhysisError::InvalidPhase(other)),
        }
    }
}

impl From<Phase> for i64 {
    fn from(phase: Phase) -> Self {
        phase.index()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Snapshot of the simulated body
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    /// Horizontal position, bounded to [-10, 10] by the simulator
    pub x: f64,
    /// Vertical position, bounded to [0, 20] by the simulator
    pub y: f64,
    /// Horizontal velocity
    pub vx: f64,
    /// Vertical velocity
    pub vy: f64,
    /// Scalar temperature
    pub temp: f64,
    /// Discrete phase
    #[serde(rename = "state")]
    pub phase: Phase,
}

impl State {
    /// Create a state at rest
    pub fn new(x: f64, y: f64, temp: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            temp,
            phase: Phase::Solid,
        }
    }

    /// Set the velocity
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Set the phase
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Integrate position from velocity (`x += vx; y += vy`)
    pub fn integrate(mut self) -> Self {
        self.x += self.vx;
        self.y += self.vy;
        self
    }

    /// Clamp position into the world bounds
    pub fn clamp_to_bounds(mut self) -> Self {
        self.x = self.x.clamp(X_BOUNDS.0, X_BOUNDS.1);
        self.y = self.y.clamp(Y_BOUNDS.0, Y_BOUNDS.1);
        self
    }

    /// Short content fingerprint of the exact state
    ///
    /// First 8 hex characters of a BLAKE3 digest over the field bytes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for value in [self.x, self.y, self.vx, self.vy, self.temp] {
            hasher.update(&value.to_le_bytes());
        }
        hasher.update(&self.phase.index().to_le_bytes());
        let hex = hasher.finalize().to_hex();
        hex[..8].to_string()
    }
}

/// Total prediction error between a predicted and an observed state
///
/// Sum of absolute differences over x, y, vx, vy and temp, plus twice the
/// absolute phase difference.
pub fn prediction_error(predicted: &State, actual: &State) -> f64 {
    let continuous = (predicted.x - actual.x).abs()
        + (predicted.y - actual.y).abs()
        + (predicted.vx - actual.vx).abs()
        + (predicted.vy - actual.vy).abs()
        + (predicted.temp - actual.temp).abs();
    let discrete = (predicted.phase.index() - actual.phase.index()).abs() as f64;
    continuous + discrete * PHASE_ERROR_WEIGHT
}
