pub mod comparison;
pub mod joint;
pub mod pose_reference;
pub mod skeleton;
pub mod training_session;

pub use comparison::{Correction, JointError, PoseComparisonResult};
pub use joint::{
    Joint, JointName, Point, UnknownJointName, Vector2, FEEDBACK_PRIORITY, POSITIONING_KEY_JOINTS,
};
pub use pose_reference::{JointStatus, PoseReference};
pub use skeleton::{BoundingBox, DetectedPerson, FrameObservation, RawBody, RawJoint, Skeleton};
pub use training_session::{
    FrameAssessment, HoldTimer, PersonStatus, TrainingEvent, TrainingSession, TrainingState,
};
