use thiserror::Error;

use crate::models::joint::JointName;

/// Problems with persisted reference pose data, detected at load time
#[derive(Error, Debug)]
pub enum PoseDataError {
    #[error("Pose data missing: no reference pose '{0}'")]
    NotFound(String),
    #[error("Pose '{pose_id}' uses unknown joint name '{name}'")]
    UnknownJointName { pose_id: String, name: String },
    #[error("Pose '{pose_id}' marks joint '{joint}' as both ignored and important")]
    ConflictingJointFlags { pose_id: String, joint: JointName },
    #[error("Pose '{pose_id}' joint '{joint}' has {field} {value} outside [0, 1]")]
    InvalidCoordinate {
        pose_id: String,
        joint: JointName,
        field: &'static str,
        value: f64,
    },
    #[error("Pose id must not be empty")]
    EmptyPoseId,
    #[error("Pose id '{0}' cannot be used as a file name")]
    InvalidPoseId(String),
    #[error("Pose file {} declares id '{pose_id}'", file.display())]
    FileIdMismatch {
        file: std::path::PathBuf,
        pose_id: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed pose JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced when a training session cannot be set up or driven
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Training list is empty: no reference poses to train")]
    EmptyTrainingList,
    #[error("Cannot start at pose {index}: training list has {total} poses")]
    StartIndexOutOfRange { index: usize, total: usize },
    #[error("Pose data error: {0}")]
    PoseData(#[from] PoseDataError),
    #[error("Training session is not running")]
    NotRunning,
    #[error("Training session was already stopped")]
    AlreadyStopped,
    #[error("Training task failed: {0}")]
    TaskFailed(String),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
