//! Training session state, hold timer and the events emitted by the
//! training state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

use crate::models::pose_reference::PoseReference;

/// Countdown that must run to zero while a pose is held.
///
/// Losing the match stops the timer and restores the full duration; there is
/// no pause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldTimer {
    required: Duration,
    remaining: Duration,
    active: bool,
}

impl HoldTimer {
    pub fn new(required: Duration) -> Self {
        Self {
            required,
            remaining: required,
            active: false,
        }
    }

    pub fn start(&mut self) {
        self.active = true;
        self.remaining = self.required;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.remaining = self.required;
    }

    /// Advance by `elapsed`. Returns true exactly once, on the tick that
    /// reaches zero; the timer is inactive afterwards.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.active {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.active = false;
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn required_duration(&self) -> Duration {
        self.required
    }

    pub fn remaining_time(&self) -> Duration {
        self.remaining
    }

    /// Fraction of the hold already completed, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.required.is_zero() {
            return 1.0;
        }
        1.0 - self.remaining.as_secs_f64() / self.required.as_secs_f64()
    }
}

/// Ordered list of poses being trained and the progress through it
#[derive(Debug, Clone)]
pub struct TrainingSession {
    pub id: Uuid,
    poses: Vec<PoseReference>,
    current_index: usize,
    completed: BTreeSet<usize>,
    is_completed: bool,
    pub started_at: DateTime<Utc>,
}

impl TrainingSession {
    /// `None` for an empty pose list
    pub fn new(poses: Vec<PoseReference>) -> Option<Self> {
        Self::starting_at(poses, 0)
    }

    /// Resume partway through the list. `None` when `start_index` is past the end.
    pub fn starting_at(poses: Vec<PoseReference>, start_index: usize) -> Option<Self> {
        if start_index >= poses.len() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            poses,
            current_index: start_index,
            completed: BTreeSet::new(),
            is_completed: false,
            started_at: Utc::now(),
        })
    }

    pub fn current_pose(&self) -> Option<&PoseReference> {
        if self.is_completed {
            return None;
        }
        self.poses.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_poses(&self) -> usize {
        self.poses.len()
    }

    pub fn completed_indices(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Mark the current pose complete and move to the next one
    pub fn advance(&mut self) {
        if self.is_completed {
            return;
        }

        self.completed.insert(self.current_index);
        self.current_index += 1;
        if self.current_index >= self.poses.len() {
            self.is_completed = true;
        }
    }

    /// Go back to the first pose. Completed indices and the start time are kept.
    pub fn reset_to_first(&mut self) {
        self.current_index = 0;
        self.is_completed = false;
    }

    pub fn progress(&self) -> f64 {
        self.current_index.min(self.poses.len()) as f64 / self.poses.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Idle,
    /// Waiting for the person to stand in the acceptance region long enough
    Positioning,
    AwaitingMatch,
    Holding,
    /// A pose was completed; the next one is installed after a short delay
    Transitioning,
    Completed,
}

/// Where the selected person is relative to the acceptance region this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonStatus {
    Absent,
    OutOfRegion,
    InRegion,
}

/// Everything the state machine needs to know about one processed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAssessment {
    pub person: PersonStatus,
    pub is_match: bool,
}

impl FrameAssessment {
    pub fn no_person() -> Self {
        Self {
            person: PersonStatus::Absent,
            is_match: false,
        }
    }

    pub fn in_region(is_match: bool) -> Self {
        Self {
            person: PersonStatus::InRegion,
            is_match,
        }
    }

    pub fn out_of_region(is_match: bool) -> Self {
        Self {
            person: PersonStatus::OutOfRegion,
            is_match,
        }
    }
}

/// Transitions published to presentation and audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrainingEvent {
    SessionStarted { session_id: Uuid, total_poses: usize },
    PositioningCompleted,
    PoseActivated { index: usize, pose_id: String },
    MatchStarted { index: usize },
    MatchLost { index: usize },
    PoseCompleted { index: usize, pose_id: String },
    SessionCompleted { session_id: Uuid },
    /// The confirmed person left; the grace period is running
    PersonLost,
    /// The person came back before the grace period elapsed
    PersonReturned,
    /// The grace period elapsed and the session went back to the first pose
    PositioningLost,
    CorrectionHint { message: String },
    /// The person is visible but outside the acceptance region
    PositioningHint { message: String },
    SessionStopped,
}
