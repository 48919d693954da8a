use serde::Serialize;

use crate::config::PositioningConfig;
use crate::models::{DetectedPerson, JointName, POSITIONING_KEY_JOINTS};

/// Outcome of checking whether a person stands where comparison works well
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositioningCheck {
    /// Vertical extent of the body as a fraction of the frame height
    pub body_height_ratio: f64,
    pub height_ok: bool,
    pub centered: bool,
    pub visible_key_joints: usize,
    pub key_joints_ok: bool,
}

impl PositioningCheck {
    pub fn in_region(&self) -> bool {
        self.height_ok && self.centered && self.key_joints_ok
    }

    /// Short instruction for whichever condition fails first
    pub fn hint(&self) -> Option<&'static str> {
        if !self.key_joints_ok {
            Some("Make sure your whole body is visible")
        } else if !self.height_ok {
            Some("Step closer or further away from the camera")
        } else if !self.centered {
            Some("Move to the center of the frame")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositioningService {
    config: PositioningConfig,
}

impl PositioningService {
    pub fn new(config: PositioningConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, person: &DetectedPerson) -> PositioningCheck {
        let body_height_ratio = self.body_height_ratio(person);
        let height_ok = (self.config.min_body_height_ratio..=self.config.max_body_height_ratio)
            .contains(&body_height_ratio);

        let center_x = person.bounding_box.center().x;
        let centered = (center_x - 0.5).abs() <= self.config.center_tolerance;

        let visible_key_joints = POSITIONING_KEY_JOINTS
            .iter()
            .filter(|name| {
                person
                    .skeleton
                    .confident(**name, self.config.key_joint_min_confidence)
                    .is_some()
            })
            .count();

        PositioningCheck {
            body_height_ratio,
            height_ok,
            centered,
            visible_key_joints,
            key_joints_ok: visible_key_joints >= self.config.min_visible_key_joints,
        }
    }

    /// Nose to lowest ankle when both are measurable, otherwise box height
    fn body_height_ratio(&self, person: &DetectedPerson) -> f64 {
        let min_confidence = self.config.height_joint_min_confidence;
        let skeleton = &person.skeleton;

        let nose = skeleton.confident(JointName::Nose, min_confidence);
        let lowest_ankle = [JointName::LeftAnkle, JointName::RightAnkle]
            .iter()
            .filter_map(|name| skeleton.confident(*name, min_confidence))
            .map(|ankle| ankle.y)
            .fold(None, |lowest: Option<f64>, y| Some(lowest.map_or(y, |l| l.max(y))));

        match (nose, lowest_ankle) {
            (Some(nose), Some(ankle_y)) => (ankle_y - nose.y).abs(),
            _ => person.bounding_box.height,
        }
    }
}
