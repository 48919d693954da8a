#![allow(dead_code)]

use posture_coach::config::{Config, CoordinateOrigin};
use posture_coach::models::{
    BoundingBox, FrameObservation, Joint, JointName, PoseReference, RawBody, RawJoint,
};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

pub const TICK: Duration = Duration::from_millis(100);

/// Config for recorded frames that already use top-left coordinates
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.normalization.source_origin = CoordinateOrigin::TopLeft;
    config.training.hold_duration_ms = 1000;
    config.training.advance_delay_ms = 500;
    config.comparison.similarity_threshold = 0.9;
    config
}

pub fn reference(id: &str, joints: &[(JointName, f64, f64)], important: &[JointName]) -> PoseReference {
    let joints: BTreeMap<_, _> = joints
        .iter()
        .map(|(name, x, y)| (*name, Joint::new(*x, *y, 1.0)))
        .collect();
    PoseReference::new(
        id,
        joints,
        BTreeSet::new(),
        important.iter().copied().collect(),
    )
    .unwrap()
}

/// Arms out to the sides at shoulder height
pub fn t_pose() -> PoseReference {
    reference(
        "t_pose",
        &[
            (JointName::LeftShoulder, 0.45, 0.3),
            (JointName::RightShoulder, 0.55, 0.3),
            (JointName::LeftWrist, 0.25, 0.3),
            (JointName::RightWrist, 0.75, 0.3),
        ],
        &[JointName::LeftWrist, JointName::RightWrist],
    )
}

/// Both arms straight up
pub fn arms_up() -> PoseReference {
    reference(
        "arms_up",
        &[
            (JointName::LeftShoulder, 0.45, 0.3),
            (JointName::RightShoulder, 0.55, 0.3),
            (JointName::LeftWrist, 0.43, 0.05),
            (JointName::RightWrist, 0.57, 0.05),
        ],
        &[],
    )
}

/// A full standing body centered in frame, with wrists placed by the caller
pub fn standing_body(left_wrist: (f64, f64), right_wrist: (f64, f64)) -> RawBody {
    let joints = [
        ("nose", 0.5, 0.2),
        ("neck", 0.5, 0.27),
        ("leftShoulder", 0.45, 0.3),
        ("rightShoulder", 0.55, 0.3),
        ("leftWrist", left_wrist.0, left_wrist.1),
        ("rightWrist", right_wrist.0, right_wrist.1),
        ("leftHip", 0.46, 0.5),
        ("rightHip", 0.54, 0.5),
        ("leftAnkle", 0.46, 0.8),
        ("rightAnkle", 0.54, 0.8),
    ];

    RawBody {
        confidence: 0.9,
        bounding_box: Some(BoundingBox::new(0.35, 0.15, 0.3, 0.7)),
        joints: joints
            .iter()
            .map(|(name, x, y)| RawJoint {
                name: name.to_string(),
                x: *x,
                y: *y,
                confidence: 0.9,
            })
            .collect(),
    }
}

pub fn t_pose_frame(timestamp_ms: u64) -> FrameObservation {
    FrameObservation::new(timestamp_ms, vec![standing_body((0.25, 0.3), (0.75, 0.3))])
}

pub fn arms_up_frame(timestamp_ms: u64) -> FrameObservation {
    FrameObservation::new(timestamp_ms, vec![standing_body((0.43, 0.05), (0.57, 0.05))])
}

/// Standing in frame with arms hanging down, matching neither pose
pub fn relaxed_frame(timestamp_ms: u64) -> FrameObservation {
    FrameObservation::new(timestamp_ms, vec![standing_body((0.43, 0.55), (0.57, 0.55))])
}

/// Holding the T pose exactly, but standing off to the side of the frame
pub fn off_center_t_pose_frame(timestamp_ms: u64) -> FrameObservation {
    let mut body = standing_body((0.25, 0.3), (0.75, 0.3));
    body.bounding_box = Some(BoundingBox::new(0.6, 0.15, 0.3, 0.7));
    FrameObservation::new(timestamp_ms, vec![body])
}
