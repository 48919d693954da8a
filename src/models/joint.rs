//! Body joint model shared by the detector adapter and reference poses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical body landmark identifiers.
///
/// The string form (camelCase, e.g. `"leftElbow"`) is what reference pose
/// files and detector adapters use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JointName {
    // Head
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    Neck,

    // Arms
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,

    // Body
    LeftHip,
    RightHip,
    Root,

    // Legs
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointName {
    pub const ALL: [JointName; 19] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
        JointName::Neck,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::Root,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    /// Canonical identifier as written in pose files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
            Self::LeftEar => "leftEar",
            Self::RightEar => "rightEar",
            Self::Neck => "neck",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftWrist => "leftWrist",
            Self::RightWrist => "rightWrist",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
            Self::Root => "root",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftAnkle => "leftAnkle",
            Self::RightAnkle => "rightAnkle",
        }
    }

    /// Human readable name used in correction messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left eye",
            Self::RightEye => "right eye",
            Self::LeftEar => "left ear",
            Self::RightEar => "right ear",
            Self::Neck => "neck",
            Self::LeftShoulder => "left shoulder",
            Self::RightShoulder => "right shoulder",
            Self::LeftElbow => "left elbow",
            Self::RightElbow => "right elbow",
            Self::LeftWrist => "left wrist",
            Self::RightWrist => "right wrist",
            Self::LeftHip => "left hip",
            Self::RightHip => "right hip",
            Self::Root => "body center",
            Self::LeftKnee => "left knee",
            Self::RightKnee => "right knee",
            Self::LeftAnkle => "left ankle",
            Self::RightAnkle => "right ankle",
        }
    }

    /// Face landmarks are usually left out of posture comparison by pose editors
    pub fn is_face(&self) -> bool {
        matches!(
            self,
            Self::LeftEye | Self::RightEye | Self::LeftEar | Self::RightEar
        )
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownJointName(pub String);

impl fmt::Display for UnknownJointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown joint name '{}'", self.0)
    }
}

impl std::error::Error for UnknownJointName {}

impl FromStr for JointName {
    type Err = UnknownJointName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|joint| joint.as_str() == s)
            .ok_or_else(|| UnknownJointName(s.to_string()))
    }
}

/// Joints used to decide whether enough of the body is in frame
pub const POSITIONING_KEY_JOINTS: [JointName; 7] = [
    JointName::Nose,
    JointName::LeftShoulder,
    JointName::RightShoulder,
    JointName::LeftHip,
    JointName::RightHip,
    JointName::LeftAnkle,
    JointName::RightAnkle,
];

/// Joints whose corrections are reported even when the reference does not flag them
pub const FEEDBACK_PRIORITY: [JointName; 6] = [
    JointName::RightElbow,
    JointName::LeftElbow,
    JointName::RightKnee,
    JointName::LeftKnee,
    JointName::RightWrist,
    JointName::LeftWrist,
];

/// A 2D point in normalized, top-left-origin image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Displacement between two points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2 {
    /// Vector pointing from `from` to `to`
    pub fn between(from: &Point, to: &Point) -> Self {
        Self {
            dx: to.x - from.x,
            dy: to.y - from.y,
        }
    }

    pub fn length(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

/// A single detected or reference landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// X coordinate (normalized 0-1)
    pub x: f64,
    /// Y coordinate (normalized 0-1, top-left origin)
    pub y: f64,
    /// Detector certainty, or a fixed value for authored joints
    pub confidence: f64,
}

impl Joint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence
    }

    pub fn distance_to(&self, other: &Joint) -> f64 {
        self.position().distance_to(&other.position())
    }
}
