//! Compute controller: scales planning effort with model confidence

use serde::{Deserialize, Serialize};

use physis_common::RingBuffer;

use crate::config::LearningSettings;

/// How hard the agent thinks on the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ThinkingLevel {
    Minimal = 1,
    Moderate = 2,
    Deep = 3,
}

impl ThinkingLevel {
    /// Planner depth budget for this level
    pub fn planning_depth(self) -> usize {
        match self {
            ThinkingLevel::Minimal => 5,
            ThinkingLevel::Moderate => 10,
            ThinkingLevel::Deep => 15,
        }
    }
}

impl From<ThinkingLevel> for u8 {
    fn from(level: ThinkingLevel) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for ThinkingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ThinkingLevel::Minimal),
            2 => Ok(ThinkingLevel::Moderate),
            3 => Ok(ThinkingLevel::Deep),
            other => Err(format!("thinking level out of range: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComputeController {
    level: ThinkingLevel,
    confidence_history: RingBuffer<f64>,
    surprise_threshold: f64,
}

impl ComputeController {
    pub fn new(settings: &LearningSettings) -> Self {
        Self {
            level: ThinkingLevel::Minimal,
            confidence_history: RingBuffer::new(settings.confidence_window),
            surprise_threshold: settings.surprise_threshold,
        }
    }

    /// Record a confidence sample and re-derive the thinking level
    pub fn adjust_thinking(&mut self, confidence: f64) -> ThinkingLevel {
        self.confidence_history.push(confidence);
        let avg = self.confidence_history.mean().unwrap_or(confidence);

        self.level = if avg > 0.8 {
            ThinkingLevel::Minimal
        } else if avg > 0.5 {
            ThinkingLevel::Moderate
        } else {
            ThinkingLevel::Deep
        };
        self.level
    }

    pub fn thinking_level(&self) -> ThinkingLevel {
        self.level
    }

    pub fn planning_depth(&self) -> usize {
        self.level.planning_depth()
    }

    /// Hypotheses are worth generating on a large surprise or while thinking deeply
    pub fn should_generate_hypotheses(&self, surprise: f64) -> bool {
        surprise > self.surprise_threshold || self.level == ThinkingLevel::Deep
    }
}

impl Default for ComputeController {
    fn default() -> Self {
        Self::new(&LearningSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_confidence_thinks_deeply() {
        let mut controller = ComputeController::default();
        assert_eq!(controller.thinking_level(), ThinkingLevel::Minimal);
        assert_eq!(controller.adjust_thinking(0.1), ThinkingLevel::Deep);
        assert_eq!(controller.planning_depth(), 15);
        assert!(controller.should_generate_hypotheses(0.0));
    }

    #[test]
    fn test_level_follows_window_average() {
        let mut controller = ComputeController::default();
        for _ in 0..10 {
            controller.adjust_thinking(0.95);
        }
        assert_eq!(controller.thinking_level(), ThinkingLevel::Minimal);
        assert_eq!(controller.planning_depth(), 5);
        assert!(!controller.should_generate_hypotheses(0.7));
        assert!(controller.should_generate_hypotheses(0.71));

        // Five low samples pull the ten-sample mean to 0.525
        for _ in 0..5 {
            controller.adjust_thinking(0.1);
        }
        assert_eq!(controller.thinking_level(), ThinkingLevel::Moderate);
        assert_eq!(controller.planning_depth(), 10);
    }

    #[test]
    fn test_old_samples_are_forgotten() {
        let mut controller = ComputeController::default();
        controller.adjust_thinking(0.05);
        for _ in 0..10 {
            controller.adjust_thinking(0.9);
        }
        assert_eq!(controller.thinking_level(), ThinkingLevel::Minimal);
    }

    #[test]
    fn test_level_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ThinkingLevel::Deep).unwrap(), "3");
        assert!(serde_json::from_str::<ThinkingLevel>("4").is_err());
    }
}
