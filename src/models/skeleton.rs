//! Detector input records and the normalized skeletons built from them.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::joint::{Joint, JointName, Point};

/// One joint as reported by the upstream detector, in its own coordinate convention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

/// One candidate body reported by the detector for a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBody {
    /// Detector confidence that this is a person
    pub confidence: f64,
    /// Person rectangle in detector coordinates, when the detector provides one
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    pub joints: Vec<RawJoint>,
}

/// Everything the detector reported for one camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameObservation {
    /// Capture time in milliseconds since the start of the stream
    pub timestamp_ms: u64,
    #[serde(default)]
    pub bodies: Vec<RawBody>,
}

impl FrameObservation {
    pub fn new(timestamp_ms: u64, bodies: Vec<RawBody>) -> Self {
        Self {
            timestamp_ms,
            bodies,
        }
    }

    pub fn empty(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, Vec::new())
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        i64::try_from(self.timestamp_ms)
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .unwrap_or_else(Utc::now)
    }
}

/// Axis-aligned rectangle in normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest box containing every joint, or `None` for an empty skeleton
    pub fn from_joints<'a>(joints: impl IntoIterator<Item = &'a Joint>) -> Option<Self> {
        let mut iter = joints.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for joint in iter {
            min_x = min_x.min(joint.x);
            min_y = min_y.min(joint.y);
            max_x = max_x.max(joint.x);
            max_y = max_y.max(joint.y);
        }

        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Mirror the box between bottom-left and top-left origin conventions
    pub fn flipped_vertically(&self) -> Self {
        Self::new(self.x, 1.0 - self.y - self.height, self.width, self.height)
    }
}

/// Confidence-filtered, top-left-origin joint map for one body at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub joints: BTreeMap<JointName, Joint>,
    pub timestamp: DateTime<Utc>,
}

impl Skeleton {
    pub fn new(joints: BTreeMap<JointName, Joint>, timestamp: DateTime<Utc>) -> Self {
        Self { joints, timestamp }
    }

    pub fn from_joints(joints: impl IntoIterator<Item = (JointName, Joint)>) -> Self {
        Self::new(joints.into_iter().collect(), Utc::now())
    }

    pub fn get(&self, name: JointName) -> Option<&Joint> {
        self.joints.get(&name)
    }

    /// Joint if present and at least `min_confidence` certain
    pub fn confident(&self, name: JointName, min_confidence: f64) -> Option<&Joint> {
        self.get(name).filter(|joint| joint.is_confident(min_confidence))
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }
}

/// A normalized candidate body ready for selection and comparison
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPerson {
    pub skeleton: Skeleton,
    pub bounding_box: BoundingBox,
    pub confidence: f64,
}

impl DetectedPerson {
    /// Tracking point for this body.
    ///
    /// Shoulder midpoint when both shoulders are confident, otherwise the
    /// neck, otherwise the center of the bounding box.
    pub fn centroid(&self, min_confidence: f64) -> Point {
        let left = self
            .skeleton
            .confident(JointName::LeftShoulder, min_confidence);
        let right = self
            .skeleton
            .confident(JointName::RightShoulder, min_confidence);

        if let (Some(left), Some(right)) = (left, right) {
            return left.position().midpoint(&right.position());
        }

        if let Some(neck) = self.skeleton.confident(JointName::Neck, min_confidence) {
            return neck.position();
        }

        self.bounding_box.center()
    }
}
