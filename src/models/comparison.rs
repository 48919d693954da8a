use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::joint::{JointName, Point, Vector2};

/// Direction a joint has to move to reach its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    Raise,
    Lower,
    MoveLeft,
    MoveRight,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Raise => "raise",
            Self::Lower => "lower",
            Self::MoveLeft => "move left",
            Self::MoveRight => "move right",
        };
        f.write_str(text)
    }
}

/// Per-joint deviation between the live skeleton and the reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointError {
    pub joint_name: JointName,
    pub current_position: Point,
    pub target_position: Point,
    pub distance: f64,
    /// target - current
    pub direction: Vector2,
}

impl JointError {
    pub fn new(joint_name: JointName, current_position: Point, target_position: Point) -> Self {
        Self {
            joint_name,
            current_position,
            target_position,
            distance: current_position.distance_to(&target_position),
            direction: Vector2::between(&current_position, &target_position),
        }
    }

    /// Correction along the dominant axis of the error vector.
    ///
    /// Coordinates are top-left origin, so a negative `dy` means the target
    /// is higher on screen. `None` when the joint is already on target.
    pub fn correction(&self) -> Option<Correction> {
        let Vector2 { dx, dy } = self.direction;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        let correction = if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Correction::MoveRight
            } else {
                Correction::MoveLeft
            }
        } else if dy < 0.0 {
            Correction::Raise
        } else {
            Correction::Lower
        };
        Some(correction)
    }

    /// Correction sentence, or `None` when the joint is within `threshold`
    pub fn correction_message(&self, threshold: f64) -> Option<String> {
        if self.distance <= threshold {
            return None;
        }

        let joint = self.joint_name.display_name();
        let message = match self.correction()? {
            Correction::Raise => format!("Raise your {}", joint),
            Correction::Lower => format!("Lower your {}", joint),
            Correction::MoveLeft => format!("Move your {} to the left", joint),
            Correction::MoveRight => format!("Move your {} to the right", joint),
        };
        Some(message)
    }
}

/// Result of comparing one skeleton against one reference pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseComparisonResult {
    /// Weighted similarity in [0, 1]
    pub overall_similarity: f64,
    pub per_joint_error: BTreeMap<JointName, JointError>,
    pub is_match: bool,
    pub feedback_messages: Vec<String>,
}

impl PoseComparisonResult {
    /// Result for a frame with nothing comparable
    pub fn empty() -> Self {
        Self {
            overall_similarity: 0.0,
            per_joint_error: BTreeMap::new(),
            is_match: false,
            feedback_messages: Vec::new(),
        }
    }

    pub fn similarity_percentage(&self) -> f64 {
        self.overall_similarity * 100.0
    }

    pub fn compared_joints(&self) -> usize {
        self.per_joint_error.len()
    }
}
