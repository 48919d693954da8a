//! Persisted reference skeletons.
//!
//! A reference pose file has the shape
//! `{ "poseId", "joints": { name: {x, y, confidence} }, "ignoredJoints", "importantJoints" }`.
//! Files are parsed into a loosely typed document first so that problems
//! (unknown joint names, conflicting flags, out-of-range values) can be
//! reported precisely instead of being silently misapplied.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::PoseDataError;
use crate::models::joint::{Joint, JointName, Point};
use crate::models::skeleton::Skeleton;

/// A named, validated target skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct PoseReference {
    pub pose_id: String,
    pub joints: BTreeMap<JointName, Joint>,
    pub ignored_joints: BTreeSet<JointName>,
    pub important_joints: BTreeSet<JointName>,
}

/// How a joint takes part in comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointStatus {
    Normal,
    Ignored,
    Important,
}

/// On-disk document shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoseDocument {
    pose_id: String,
    joints: BTreeMap<String, Joint>,
    #[serde(default)]
    ignored_joints: Vec<String>,
    #[serde(default)]
    important_joints: Vec<String>,
}

impl PoseReference {
    /// Build and validate a reference from typed parts
    pub fn new(
        pose_id: impl Into<String>,
        joints: BTreeMap<JointName, Joint>,
        ignored_joints: BTreeSet<JointName>,
        important_joints: BTreeSet<JointName>,
    ) -> Result<Self, PoseDataError> {
        let reference = Self {
            pose_id: pose_id.into(),
            joints,
            ignored_joints,
            important_joints,
        };
        reference.validate()?;
        Ok(reference)
    }

    /// Use a captured skeleton as a reference, e.g. from a still image.
    ///
    /// Face landmarks and the root joint are left out; every kept joint
    /// starts out normal.
    pub fn from_skeleton(pose_id: impl Into<String>, skeleton: &Skeleton) -> Result<Self, PoseDataError> {
        let joints = skeleton
            .joints
            .iter()
            .filter(|(name, _)| !name.is_face() && **name != JointName::Root)
            .map(|(name, joint)| (*name, *joint))
            .collect();
        Self::new(pose_id, joints, BTreeSet::new(), BTreeSet::new())
    }

    /// Parse and validate a reference pose JSON document
    pub fn from_json_str(json: &str) -> Result<Self, PoseDataError> {
        let document: PoseDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PoseDataError> {
        let document: PoseDocument = serde_json::from_slice(bytes)?;
        Self::from_document(document)
    }

    pub fn to_json_string(&self) -> Result<String, PoseDataError> {
        let document = PoseDocument {
            pose_id: self.pose_id.clone(),
            joints: self
                .joints
                .iter()
                .map(|(name, joint)| (name.as_str().to_string(), *joint))
                .collect(),
            ignored_joints: self
                .ignored_joints
                .iter()
                .map(|name| name.as_str().to_string())
                .collect(),
            important_joints: self
                .important_joints
                .iter()
                .map(|name| name.as_str().to_string())
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    fn from_document(document: PoseDocument) -> Result<Self, PoseDataError> {
        let pose_id = document.pose_id;
        let parse = |name: &str| {
            name.parse::<JointName>()
                .map_err(|_| PoseDataError::UnknownJointName {
                    pose_id: pose_id.clone(),
                    name: name.to_string(),
                })
        };

        let mut joints = BTreeMap::new();
        for (name, joint) in &document.joints {
            joints.insert(parse(name)?, *joint);
        }

        let ignored_joints = document
            .ignored_joints
            .iter()
            .map(|name| parse(name))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let important_joints = document
            .important_joints
            .iter()
            .map(|name| parse(name))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Self::new(pose_id, joints, ignored_joints, important_joints)
    }

    /// Reject empty ids, conflicting flags and out-of-range values
    pub fn validate(&self) -> Result<(), PoseDataError> {
        if self.pose_id.trim().is_empty() {
            return Err(PoseDataError::EmptyPoseId);
        }

        if let Some(joint) = self.ignored_joints.intersection(&self.important_joints).next() {
            return Err(PoseDataError::ConflictingJointFlags {
                pose_id: self.pose_id.clone(),
                joint: *joint,
            });
        }

        for (name, joint) in &self.joints {
            for (field, value) in [("x", joint.x), ("y", joint.y), ("confidence", joint.confidence)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(PoseDataError::InvalidCoordinate {
                        pose_id: self.pose_id.clone(),
                        joint: *name,
                        field,
                        value,
                    });
                }
            }
        }

        if self.comparable_joints().next().is_none() {
            tracing::warn!(
                "Reference pose '{}' has no comparable joints; it can never match",
                self.pose_id
            );
        }

        Ok(())
    }

    /// Joints that take part in comparison (present and not ignored)
    pub fn comparable_joints(&self) -> impl Iterator<Item = (&JointName, &Joint)> {
        self.joints
            .iter()
            .filter(move |(name, _)| !self.ignored_joints.contains(name))
    }

    pub fn is_ignored(&self, name: JointName) -> bool {
        self.ignored_joints.contains(&name)
    }

    pub fn is_important(&self, name: JointName) -> bool {
        self.important_joints.contains(&name)
    }

    pub fn joint_status(&self, name: JointName) -> JointStatus {
        if self.is_ignored(name) {
            JointStatus::Ignored
        } else if self.is_important(name) {
            JointStatus::Important
        } else {
            JointStatus::Normal
        }
    }

    /// Give a joint `status`, or set it back to normal if it already has it.
    /// A joint is never both ignored and important afterwards.
    ///
    /// Returns the new status, or `None` when the pose has no such joint.
    pub fn toggle_joint_status(&mut self, name: JointName, status: JointStatus) -> Option<JointStatus> {
        if !self.joints.contains_key(&name) {
            return None;
        }

        let next = if self.joint_status(name) == status {
            JointStatus::Normal
        } else {
            status
        };

        self.ignored_joints.remove(&name);
        self.important_joints.remove(&name);
        match next {
            JointStatus::Ignored => {
                self.ignored_joints.insert(name);
            }
            JointStatus::Important => {
                self.important_joints.insert(name);
            }
            JointStatus::Normal => {}
        }
        Some(next)
    }

    /// Place a joint by hand. The position is clamped into the frame and the
    /// joint gets full confidence. Returns false when the pose has no such joint.
    pub fn move_joint(&mut self, name: JointName, to: Point) -> bool {
        let Some(joint) = self.joints.get_mut(&name) else {
            return false;
        };
        *joint = Joint::new(to.x.clamp(0.0, 1.0), to.y.clamp(0.0, 1.0), 1.0);
        true
    }

    /// Drop a joint together with its ignored/important flag
    pub fn remove_joint(&mut self, name: JointName) -> Option<Joint> {
        self.ignored_joints.remove(&name);
        self.important_joints.remove(&name);
        self.joints.remove(&name)
    }

    /// Mirror every joint between bottom-left and top-left origin conventions
    pub fn flipped_vertically(&self) -> Self {
        Self {
            joints: self
                .joints
                .iter()
                .map(|(name, joint)| (*name, Joint::new(joint.x, 1.0 - joint.y, joint.confidence)))
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SAMPLE: &str = r#"{
        "poseId": "jurus1_pose1",
        "joints": {
            "leftElbow": {"x": 0.3, "y": 0.5, "confidence": 1.0},
            "rightElbow": {"x": 0.7, "y": 0.5, "confidence": 1.0},
            "leftEye": {"x": 0.45, "y": 0.1, "confidence": 1.0}
        },
        "ignoredJoints": ["leftEye"],
        "importantJoints": ["leftElbow"]
    }"#;

    #[test]
    fn test_parse_reference() {
        let reference = PoseReference::from_json_str(SAMPLE).unwrap();
        assert_eq!(reference.pose_id, "jurus1_pose1");
        assert_eq!(reference.joints.len(), 3);
        assert!(reference.is_ignored(JointName::LeftEye));
        assert!(reference.is_important(JointName::LeftElbow));
        assert_eq!(reference.comparable_joints().count(), 2);
    }

    #[test]
    fn test_reference_survives_json_round_trip() {
        let reference = PoseReference::from_json_str(SAMPLE).unwrap();
        let json = reference.to_json_string().unwrap();
        assert_eq!(PoseReference::from_json_str(&json).unwrap(), reference);
    }

    #[test]
    fn test_unknown_joint_name_rejected() {
        let json = r#"{"poseId": "p", "joints": {"leftToe": {"x": 0.1, "y": 0.1, "confidence": 1.0}},
            "ignoredJoints": [], "importantJoints": []}"#;
        assert_matches!(
            PoseReference::from_json_str(json),
            Err(PoseDataError::UnknownJointName { name, .. }) if name == "leftToe"
        );
    }

    #[test]
    fn test_unknown_flag_name_rejected() {
        let json = r#"{"poseId": "p", "joints": {}, "ignoredJoints": ["tail"], "importantJoints": []}"#;
        assert_matches!(
            PoseReference::from_json_str(json),
            Err(PoseDataError::UnknownJointName { .. })
        );
    }

    #[test]
    fn test_joint_in_both_sets_rejected() {
        let json = r#"{"poseId": "p",
            "joints": {"leftKnee": {"x": 0.4, "y": 0.7, "confidence": 1.0}},
            "ignoredJoints": ["leftKnee"], "importantJoints": ["leftKnee"]}"#;
        assert_matches!(
            PoseReference::from_json_str(json),
            Err(PoseDataError::ConflictingJointFlags { joint: JointName::LeftKnee, .. })
        );
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let json = r#"{"poseId": "p",
            "joints": {"nose": {"x": 1.4, "y": 0.2, "confidence": 1.0}},
            "ignoredJoints": [], "importantJoints": []}"#;
        assert_matches!(
            PoseReference::from_json_str(json),
            Err(PoseDataError::InvalidCoordinate { field: "x", .. })
        );
    }

    #[test]
    fn test_missing_flag_lists_default_to_empty() {
        let json = r#"{"poseId": "p", "joints": {"nose": {"x": 0.5, "y": 0.2, "confidence": 1.0}}}"#;
        let reference = PoseReference::from_json_str(json).unwrap();
        assert!(reference.ignored_joints.is_empty());
        assert!(reference.important_joints.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert_matches!(
            PoseReference::from_json_str("{not json"),
            Err(PoseDataError::Json(_))
        );
    }

    #[test]
    fn test_from_skeleton_leaves_out_face_and_root() {
        let skeleton = Skeleton::from_joints(vec![
            (JointName::Nose, Joint::new(0.5, 0.2, 0.9)),
            (JointName::LeftEye, Joint::new(0.48, 0.18, 0.9)),
            (JointName::Root, Joint::new(0.5, 0.5, 0.9)),
            (JointName::LeftWrist, Joint::new(0.3, 0.4, 0.8)),
        ]);

        let reference = PoseReference::from_skeleton("captured", &skeleton).unwrap();
        let names: Vec<JointName> = reference.joints.keys().copied().collect();
        assert_eq!(names, vec![JointName::Nose, JointName::LeftWrist]);
        assert!(reference.ignored_joints.is_empty());
        assert!(reference.important_joints.is_empty());
    }

    #[test]
    fn test_toggle_status_keeps_flags_exclusive() {
        let mut reference = PoseReference::from_json_str(SAMPLE).unwrap();

        // leftEye is ignored; marking it important moves it over
        assert_eq!(
            reference.toggle_joint_status(JointName::LeftEye, JointStatus::Important),
            Some(JointStatus::Important)
        );
        assert!(!reference.is_ignored(JointName::LeftEye));
        assert!(reference.is_important(JointName::LeftEye));
        reference.validate().unwrap();

        // Toggling the same status again goes back to normal
        assert_eq!(
            reference.toggle_joint_status(JointName::LeftElbow, JointStatus::Important),
            Some(JointStatus::Normal)
        );
        assert_eq!(reference.joint_status(JointName::LeftElbow), JointStatus::Normal);

        assert_eq!(
            reference.toggle_joint_status(JointName::RightKnee, JointStatus::Ignored),
            None
        );
    }

    #[test]
    fn test_move_and_remove_joint() {
        let mut reference = PoseReference::from_json_str(SAMPLE).unwrap();

        assert!(reference.move_joint(JointName::RightElbow, Point::new(1.3, 0.4)));
        assert_eq!(reference.joints[&JointName::RightElbow], Joint::new(1.0, 0.4, 1.0));
        assert!(!reference.move_joint(JointName::RightKnee, Point::new(0.5, 0.5)));

        assert!(reference.remove_joint(JointName::LeftElbow).is_some());
        assert!(!reference.is_important(JointName::LeftElbow));
        assert!(reference.remove_joint(JointName::LeftElbow).is_none());
        reference.validate().unwrap();
    }

    #[test]
    fn test_flip_reference() {
        let reference = PoseReference::from_json_str(SAMPLE).unwrap().flipped_vertically();
        let elbow = reference.joints[&JointName::LeftElbow];
        assert!((elbow.y - 0.5).abs() < 1e-9);
        let eye = reference.joints[&JointName::LeftEye];
        assert!((eye.y - 0.9).abs() < 1e-9);
    }
}
