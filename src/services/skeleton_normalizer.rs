//! Skeleton normalization.
//!
//! Turns raw detector records into confidence-filtered skeletons in the
//! single coordinate convention used downstream: top-left origin, [0, 1].

use std::collections::BTreeMap;

use crate::config::{CoordinateOrigin, NormalizationConfig};
use crate::models::{
    BoundingBox, DetectedPerson, FrameObservation, Joint, JointName, RawBody, Skeleton,
};

#[derive(Debug)]
pub struct SkeletonNormalizer {
    min_confidence: f64,
    source_origin: CoordinateOrigin,
}

impl SkeletonNormalizer {
    pub fn new(config: &NormalizationConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            source_origin: config.source_origin,
        }
    }

    /// Normalize every body in the frame.
    ///
    /// Bodies that end up with neither joints nor a detector box are dropped.
    pub fn normalize_frame(&self, frame: &FrameObservation) -> Vec<DetectedPerson> {
        frame
            .bodies
            .iter()
            .filter_map(|body| self.normalize_body(body, frame))
            .collect()
    }

    pub fn normalize_body(&self, body: &RawBody, frame: &FrameObservation) -> Option<DetectedPerson> {
        let skeleton = self.normalize_joints(body, frame);

        let bounding_box = match body.bounding_box {
            Some(bbox) => self.to_top_left_box(bbox),
            None => BoundingBox::from_joints(skeleton.joints.values())?,
        };

        Some(DetectedPerson {
            skeleton,
            bounding_box,
            confidence: body.confidence,
        })
    }

    /// Joints of one body that pass the confidence floor. An empty skeleton
    /// is a valid "no usable detection" result.
    pub fn normalize_joints(&self, body: &RawBody, frame: &FrameObservation) -> Skeleton {
        let mut joints = BTreeMap::new();

        for raw in &body.joints {
            let name = match raw.name.parse::<JointName>() {
                Ok(name) => name,
                Err(_) => {
                    tracing::trace!("Skipping unsupported detector joint '{}'", raw.name);
                    continue;
                }
            };

            if raw.confidence < self.min_confidence {
                continue;
            }

            let y = match self.source_origin {
                CoordinateOrigin::BottomLeft => 1.0 - raw.y,
                CoordinateOrigin::TopLeft => raw.y,
            };
            joints.insert(name, Joint::new(raw.x, y, raw.confidence));
        }

        Skeleton::new(joints, frame.timestamp())
    }

    fn to_top_left_box(&self, bbox: BoundingBox) -> BoundingBox {
        match self.source_origin {
            CoordinateOrigin::BottomLeft => bbox.flipped_vertically(),
            CoordinateOrigin::TopLeft => bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawJoint;

    fn raw(name: &str, x: f64, y: f64, confidence: f64) -> RawJoint {
        RawJoint {
            name: name.to_string(),
            x,
            y,
            confidence,
        }
    }

    fn normalizer(origin: CoordinateOrigin) -> SkeletonNormalizer {
        SkeletonNormalizer::new(&NormalizationConfig {
            min_confidence: 0.2,
            source_origin: origin,
        })
    }

    #[test]
    fn test_flips_bottom_left_coordinates() {
        let body = RawBody {
            confidence: 0.9,
            bounding_box: Some(BoundingBox::new(0.3, 0.1, 0.4, 0.8)),
            joints: vec![raw("nose", 0.5, 0.85, 0.9)],
        };
        let frame = FrameObservation::new(0, vec![body]);

        let people = normalizer(CoordinateOrigin::BottomLeft).normalize_frame(&frame);
        assert_eq!(people.len(), 1);

        let nose = people[0].skeleton.get(JointName::Nose).unwrap();
        assert!((nose.y - 0.15).abs() < 1e-9);
        assert!((people[0].bounding_box.y - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_keeps_top_left_coordinates() {
        let body = RawBody {
            confidence: 0.9,
            bounding_box: None,
            joints: vec![raw("leftWrist", 0.2, 0.3, 0.9)],
        };
        let frame = FrameObservation::new(0, vec![body.clone()]);
        let skeleton = normalizer(CoordinateOrigin::TopLeft).normalize_joints(&body, &frame);
        assert_eq!(skeleton.get(JointName::LeftWrist), Some(&Joint::new(0.2, 0.3, 0.9)));
    }

    #[test]
    fn test_drops_low_confidence_and_unknown_joints() {
        let body = RawBody {
            confidence: 0.9,
            bounding_box: None,
            joints: vec![
                raw("nose", 0.5, 0.5, 0.1),
                raw("leftBigToe", 0.5, 0.5, 0.9),
                raw("rightKnee", 0.6, 0.3, 0.5),
            ],
        };
        let frame = FrameObservation::new(0, vec![body]);
        let people = normalizer(CoordinateOrigin::TopLeft).normalize_frame(&frame);

        assert_eq!(people[0].skeleton.len(), 1);
        assert!(people[0].skeleton.get(JointName::RightKnee).is_some());
    }

    #[test]
    fn test_body_without_joints_or_box_is_dropped() {
        let body = RawBody {
            confidence: 0.9,
            bounding_box: None,
            joints: vec![raw("nose", 0.5, 0.5, 0.05)],
        };
        let frame = FrameObservation::new(0, vec![body]);
        assert!(normalizer(CoordinateOrigin::TopLeft).normalize_frame(&frame).is_empty());
    }

    #[test]
    fn test_body_with_box_but_no_joints_is_kept_empty() {
        let body = RawBody {
            confidence: 0.7,
            bounding_box: Some(BoundingBox::new(0.2, 0.2, 0.3, 0.6)),
            joints: Vec::new(),
        };
        let frame = FrameObservation::new(0, vec![body]);
        let people = normalizer(CoordinateOrigin::TopLeft).normalize_frame(&frame);
        assert_eq!(people.len(), 1);
        assert!(people[0].skeleton.is_empty());
    }
}
