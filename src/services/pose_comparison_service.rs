use std::collections::BTreeMap;

use crate::config::ComparisonConfig;
use crate::models::{
    JointError, JointName, Point, PoseComparisonResult, PoseReference, Skeleton, FEEDBACK_PRIORITY,
};

/// Scores a live skeleton against a reference pose
#[derive(Debug, Clone)]
pub struct PoseComparisonService {
    config: ComparisonConfig,
}

impl PoseComparisonService {
    pub fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Weighted joint-by-joint comparison.
    ///
    /// Only joints present on both sides, not ignored, and confident on both
    /// sides are scored. Each scores `max(0, 1 - distance)`, weighted by
    /// `important_joint_weight` for important joints. With nothing comparable
    /// the similarity is 0 and the result never matches.
    pub fn compare(&self, skeleton: &Skeleton, reference: &PoseReference) -> PoseComparisonResult {
        let mut per_joint_error = BTreeMap::new();
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for (name, target) in reference.comparable_joints() {
            let Some(current) = skeleton.get(*name) else {
                continue;
            };

            if !current.is_confident(self.config.min_confidence)
                || !target.is_confident(self.config.min_confidence)
            {
                continue;
            }

            let error = JointError::new(*name, current.position(), target.position());
            let similarity = (1.0 - error.distance).max(0.0);
            let weight = if reference.is_important(*name) {
                self.config.important_joint_weight
            } else {
                1.0
            };

            weighted_sum += similarity * weight;
            total_weight += weight;
            per_joint_error.insert(*name, error);
        }

        if total_weight <= 0.0 {
            tracing::trace!("No comparable joints for pose '{}'", reference.pose_id);
            return PoseComparisonResult::empty();
        }

        let overall_similarity = (weighted_sum / total_weight).clamp(0.0, 1.0);
        let feedback_messages = self.feedback_messages(&per_joint_error, reference);

        PoseComparisonResult {
            overall_similarity,
            is_match: overall_similarity >= self.config.similarity_threshold,
            per_joint_error,
            feedback_messages,
        }
    }

    /// Correction messages for the joints that matter most, capped.
    ///
    /// Important joints come first, then the fixed priority list. Joints in
    /// neither group are not reported.
    fn feedback_messages(
        &self,
        errors: &BTreeMap<JointName, JointError>,
        reference: &PoseReference,
    ) -> Vec<String> {
        let important = reference
            .important_joints
            .iter()
            .copied()
            .filter(|name| errors.contains_key(name));
        let prioritized = FEEDBACK_PRIORITY
            .into_iter()
            .filter(|name| !reference.is_important(*name));

        important
            .chain(prioritized)
            .filter_map(|name| errors.get(&name))
            .filter_map(|error| error.correction_message(self.config.joint_distance_threshold))
            .take(self.config.max_feedback_messages)
            .collect()
    }

    /// Cosine similarity of joint offsets from the body center.
    ///
    /// The center is the root joint when confident on both sides, otherwise
    /// the hip midpoint. Translation-invariant, so it tolerates a person
    /// standing off-center. Negative similarity clamps to 0, as does any case
    /// where no center or no offsets are available.
    pub fn shape_similarity(&self, skeleton: &Skeleton, reference: &PoseReference) -> f64 {
        let min_confidence = self.config.min_confidence;
        let reference_skeleton = Skeleton::new(reference.joints.clone(), skeleton.timestamp);

        let (Some(live_center), Some(target_center)) = (
            body_center(skeleton, min_confidence),
            body_center(&reference_skeleton, min_confidence),
        ) else {
            return 0.0;
        };

        let mut dot = 0.0;
        let mut live_norm = 0.0;
        let mut target_norm = 0.0;

        for (name, target) in reference.comparable_joints() {
            if *name == JointName::Root || !target.is_confident(min_confidence) {
                continue;
            }
            let Some(current) = skeleton.confident(*name, min_confidence) else {
                continue;
            };

            let (lx, ly) = (current.x - live_center.x, current.y - live_center.y);
            let (tx, ty) = (target.x - target_center.x, target.y - target_center.y);

            dot += lx * tx + ly * ty;
            live_norm += lx * lx + ly * ly;
            target_norm += tx * tx + ty * ty;
        }

        let denominator = live_norm.sqrt() * target_norm.sqrt();
        if denominator <= f64::EPSILON {
            return 0.0;
        }

        (dot / denominator).clamp(0.0, 1.0)
    }
}

fn body_center(skeleton: &Skeleton, min_confidence: f64) -> Option<Point> {
    if let Some(root) = skeleton.confident(JointName::Root, min_confidence) {
        return Some(root.position());
    }

    let left = skeleton.confident(JointName::LeftHip, min_confidence)?;
    let right = skeleton.confident(JointName::RightHip, min_confidence)?;
    Some(left.position().midpoint(&right.position()))
}
