use posture_coach::config::ComparisonConfig;
use posture_coach::models::{Joint, JointName, PoseReference, Skeleton};
use posture_coach::services::PoseComparisonService;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn joint_map(min_confidence: f64) -> impl Strategy<Value = BTreeMap<JointName, Joint>> {
    prop::collection::btree_map(
        prop::sample::select(JointName::ALL.to_vec()),
        (0.0..=1.0f64, 0.0..=1.0f64, min_confidence..=1.0f64)
            .prop_map(|(x, y, confidence)| Joint::new(x, y, confidence)),
        1..=JointName::ALL.len(),
    )
}

fn important_subset() -> impl Strategy<Value = BTreeSet<JointName>> {
    prop::collection::btree_set(prop::sample::select(JointName::ALL.to_vec()), 0..6)
}

proptest! {
    #[test]
    fn similarity_stays_in_unit_range(
        live in joint_map(0.0),
        target in joint_map(0.0),
        important in important_subset(),
    ) {
        let reference = PoseReference::new("p", target, BTreeSet::new(), important).unwrap();
        let result = PoseComparisonService::new(ComparisonConfig::default())
            .compare(&Skeleton::from_joints(live), &reference);

        prop_assert!((0.0..=1.0).contains(&result.overall_similarity));
        prop_assert!(result.feedback_messages.len() <= 2);
    }

    #[test]
    fn skeleton_matches_itself(joints in joint_map(0.3), important in important_subset()) {
        let skeleton = Skeleton::from_joints(joints.clone());
        let reference = PoseReference::new("self", joints, BTreeSet::new(), important).unwrap();
        let service = PoseComparisonService::new(ComparisonConfig::default());

        let result = service.compare(&skeleton, &reference);
        prop_assert!((result.overall_similarity - 1.0).abs() < 1e-12);
        prop_assert!(result.is_match);
        prop_assert!(result.feedback_messages.is_empty());
    }

    #[test]
    fn fully_ignored_reference_never_matches(joints in joint_map(0.3)) {
        let skeleton = Skeleton::from_joints(joints.clone());
        let ignored: BTreeSet<_> = JointName::ALL.into_iter().collect();
        let reference = PoseReference::new("ignored", joints, ignored, BTreeSet::new()).unwrap();

        let result = PoseComparisonService::new(ComparisonConfig::default())
            .compare(&skeleton, &reference);
        prop_assert_eq!(result.overall_similarity, 0.0);
        prop_assert!(!result.is_match);
    }
}

#[test]
fn test_important_joint_weighting_scenario() {
    let reference = PoseReference::from_json_str(
        r#"{
            "poseId": "elbows",
            "joints": {
                "leftElbow": {"x": 0.3, "y": 0.5, "confidence": 1.0},
                "rightElbow": {"x": 0.7, "y": 0.5, "confidence": 1.0}
            },
            "ignoredJoints": [],
            "importantJoints": ["leftElbow"]
        }"#,
    )
    .unwrap();
    let skeleton = Skeleton::from_joints(vec![
        (JointName::LeftElbow, Joint::new(0.3, 0.5, 1.0)),
        (JointName::RightElbow, Joint::new(0.75, 0.5, 1.0)),
    ]);

    let result = PoseComparisonService::new(ComparisonConfig::default()).compare(&skeleton, &reference);
    assert!((result.overall_similarity - 0.9833333).abs() < 1e-6);
}
