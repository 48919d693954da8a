// Comparison and training services

pub mod person_selector;
pub mod pose_comparison_service;
pub mod pose_store;
pub mod positioning_service;
pub mod skeleton_normalizer;
pub mod training_coordinator;
pub mod training_runner;
pub mod training_state_machine;

pub use person_selector::{PersonSelector, PersonTracker, SelectionPolicy};
pub use pose_comparison_service::PoseComparisonService;
pub use pose_store::{load_sequence, FilePoseStore, PoseInfo, PoseStore};
pub use positioning_service::{PositioningCheck, PositioningService};
pub use skeleton_normalizer::SkeletonNormalizer;
pub use training_coordinator::{FrameOutcome, TrainingCoordinator};
pub use training_runner::{TrainingHandle, TrainingRunner};
pub use training_state_machine::TrainingStateMachine;
