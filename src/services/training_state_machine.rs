//! Sequential training state machine.
//!
//! Consumes exactly two inputs: one [`FrameAssessment`] per processed frame and
//! `tick(dt)` from a periodic clock. Every timer (hold, positioning
//! stabilization, person-lost grace, advance delay) is plain state advanced by
//! `tick`, so stopping the machine cancels all of them at once and no stale
//! callback can fire into a torn-down session.

use std::time::Duration;

use crate::config::{PositioningConfig, TrainingConfig};
use crate::error::TrainingError;
use crate::models::{
    FrameAssessment, HoldTimer, PersonStatus, PoseReference, TrainingEvent, TrainingSession,
    TrainingState,
};

#[derive(Debug)]
pub struct TrainingStateMachine {
    config: TrainingConfig,
    stabilization: Duration,
    state: TrainingState,
    session: Option<TrainingSession>,
    hold_timer: HoldTimer,
    /// Time the person has been continuously in region during positioning
    positioning_elapsed: Duration,
    in_region: bool,
    person_confirmed: bool,
    /// Running while a confirmed person is missing
    grace_elapsed: Option<Duration>,
    /// Running between a completed pose and the next one being installed
    advance_elapsed: Option<Duration>,
}

impl TrainingStateMachine {
    pub fn new(config: TrainingConfig, positioning: &PositioningConfig) -> Self {
        let hold_timer = HoldTimer::new(config.hold_duration());
        Self {
            config,
            stabilization: positioning.stabilization(),
            state: TrainingState::Idle,
            session: None,
            hold_timer,
            positioning_elapsed: Duration::ZERO,
            in_region: false,
            person_confirmed: false,
            grace_elapsed: None,
            advance_elapsed: None,
        }
    }

    /// Begin a session over `poses`. Any running session is discarded.
    pub fn start(&mut self, poses: Vec<PoseReference>) -> Result<Vec<TrainingEvent>, TrainingError> {
        self.start_from(poses, 0)
    }

    /// Begin a session at `start_index`. A person-lost reset still returns
    /// to the first pose of the list.
    pub fn start_from(
        &mut self,
        poses: Vec<PoseReference>,
        start_index: usize,
    ) -> Result<Vec<TrainingEvent>, TrainingError> {
        if poses.is_empty() {
            return Err(TrainingError::EmptyTrainingList);
        }
        let total = poses.len();
        let session = TrainingSession::starting_at(poses, start_index).ok_or(
            TrainingError::StartIndexOutOfRange {
                index: start_index,
                total,
            },
        )?;
        self.cancel_timers();
        self.person_confirmed = false;

        let mut events = vec![TrainingEvent::SessionStarted {
            session_id: session.id,
            total_poses: session.total_poses(),
        }];
        tracing::info!(
            "Training session {} started with {} poses",
            session.id,
            session.total_poses()
        );
        self.session = Some(session);

        if self.config.require_positioning {
            self.state = TrainingState::Positioning;
        } else {
            self.activate_current_pose(&mut events);
        }

        Ok(events)
    }

    /// Cancel every timer and return to idle. The session is kept for inspection.
    pub fn stop(&mut self) -> Result<Vec<TrainingEvent>, TrainingError> {
        if self.state == TrainingState::Idle {
            return Err(TrainingError::NotRunning);
        }

        self.cancel_timers();
        self.person_confirmed = false;
        self.state = TrainingState::Idle;
        tracing::info!("Training session stopped");

        Ok(vec![TrainingEvent::SessionStopped])
    }

    pub fn on_frame(&mut self, frame: FrameAssessment) -> Vec<TrainingEvent> {
        let mut events = Vec::new();
        if matches!(self.state, TrainingState::Idle | TrainingState::Completed) {
            return events;
        }

        let in_region = frame.person == PersonStatus::InRegion;
        self.track_presence(in_region, &mut events);
        // A match only counts inside the acceptance region
        let is_match = frame.is_match && in_region;

        match self.state {
            TrainingState::Positioning => {
                self.in_region = in_region;
                if !in_region {
                    self.positioning_elapsed = Duration::ZERO;
                }
            }
            TrainingState::AwaitingMatch if is_match => {
                self.hold_timer.start();
                self.state = TrainingState::Holding;
                tracing::debug!("Match started on pose {}", self.current_index());
                events.push(TrainingEvent::MatchStarted {
                    index: self.current_index(),
                });
            }
            TrainingState::Holding if !is_match => {
                self.hold_timer.stop();
                self.state = TrainingState::AwaitingMatch;
                tracing::debug!("Match lost on pose {}", self.current_index());
                events.push(TrainingEvent::MatchLost {
                    index: self.current_index(),
                });
            }
            _ => {}
        }

        events
    }

    pub fn tick(&mut self, elapsed: Duration) -> Vec<TrainingEvent> {
        let mut events = Vec::new();
        if matches!(self.state, TrainingState::Idle | TrainingState::Completed) {
            return events;
        }

        if let Some(grace) = self.grace_elapsed.as_mut() {
            *grace += elapsed;
            if *grace >= self.config.grace_period() {
                self.expire_grace(&mut events);
                return events;
            }
        }

        match self.state {
            TrainingState::Positioning if self.in_region => {
                self.positioning_elapsed += elapsed;
                if self.positioning_elapsed >= self.stabilization {
                    self.positioning_elapsed = Duration::ZERO;
                    self.person_confirmed = true;
                    tracing::info!("Positioning completed");
                    events.push(TrainingEvent::PositioningCompleted);
                    self.activate_current_pose(&mut events);
                }
            }
            TrainingState::Holding => {
                if self.hold_timer.tick(elapsed) {
                    self.complete_current_pose(&mut events);
                }
            }
            TrainingState::Transitioning => {
                let waited = self.advance_elapsed.get_or_insert(Duration::ZERO);
                *waited += elapsed;
                if *waited >= self.config.advance_delay() {
                    self.advance_elapsed = None;
                    self.activate_current_pose(&mut events);
                }
            }
            _ => {}
        }

        events
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn session(&self) -> Option<&TrainingSession> {
        self.session.as_ref()
    }

    pub fn hold_timer(&self) -> &HoldTimer {
        &self.hold_timer
    }

    pub fn is_person_confirmed(&self) -> bool {
        self.person_confirmed
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, TrainingState::Idle | TrainingState::Completed)
    }

    /// Reference the live skeleton should be compared against, if any
    pub fn current_reference(&self) -> Option<&PoseReference> {
        match self.state {
            TrainingState::Positioning | TrainingState::AwaitingMatch | TrainingState::Holding => {
                self.session.as_ref()?.current_pose()
            }
            _ => None,
        }
    }

    /// Time left before a missing person resets the session
    pub fn grace_remaining(&self) -> Option<Duration> {
        self.grace_elapsed
            .map(|elapsed| self.config.grace_period().saturating_sub(elapsed))
    }

    /// Fraction of the positioning stabilization already held, 0.0 to 1.0
    pub fn positioning_progress(&self) -> f64 {
        if self.stabilization.is_zero() {
            return 1.0;
        }
        (self.positioning_elapsed.as_secs_f64() / self.stabilization.as_secs_f64()).min(1.0)
    }

    fn current_index(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.current_index())
    }

    fn track_presence(&mut self, in_region: bool, events: &mut Vec<TrainingEvent>) {
        if !self.person_confirmed {
            // Positioning confirms through its own countdown
            if in_region && self.state != TrainingState::Positioning {
                self.person_confirmed = true;
                tracing::debug!("Person confirmed");
            }
            return;
        }

        match (in_region, self.grace_elapsed.is_some()) {
            (false, false) => {
                tracing::info!("Confirmed person lost, grace period started");
                self.grace_elapsed = Some(Duration::ZERO);
                events.push(TrainingEvent::PersonLost);
            }
            (true, true) => {
                tracing::info!("Person returned within grace period");
                self.grace_elapsed = None;
                events.push(TrainingEvent::PersonReturned);
            }
            _ => {}
        }
    }

    fn expire_grace(&mut self, events: &mut Vec<TrainingEvent>) {
        tracing::warn!("Person did not return within grace period, resetting to first pose");
        self.grace_elapsed = None;
        self.advance_elapsed = None;
        self.hold_timer.stop();
        self.person_confirmed = false;

        if let Some(session) = self.session.as_mut() {
            session.reset_to_first();
        }

        events.push(TrainingEvent::PositioningLost);
        self.activate_current_pose(events);
    }

    fn complete_current_pose(&mut self, events: &mut Vec<TrainingEvent>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let index = session.current_index();
        let pose_id = session
            .current_pose()
            .map(|pose| pose.pose_id.clone())
            .unwrap_or_default();
        session.advance();

        tracing::info!("Pose {} ('{}') completed", index, pose_id);
        events.push(TrainingEvent::PoseCompleted { index, pose_id });

        if session.is_completed() {
            let session_id = session.id;
            self.cancel_timers();
            self.state = TrainingState::Completed;
            tracing::info!("Training session {} completed", session_id);
            events.push(TrainingEvent::SessionCompleted { session_id });
        } else {
            self.state = TrainingState::Transitioning;
            self.advance_elapsed = Some(Duration::ZERO);
        }
    }

    fn activate_current_pose(&mut self, events: &mut Vec<TrainingEvent>) {
        self.hold_timer.stop();
        self.state = TrainingState::AwaitingMatch;

        if let Some(pose) = self.session.as_ref().and_then(|s| s.current_pose()) {
            let index = self.current_index();
            tracing::debug!("Pose {} ('{}') activated", index, pose.pose_id);
            events.push(TrainingEvent::PoseActivated {
                index,
                pose_id: pose.pose_id.clone(),
            });
        }
    }

    fn cancel_timers(&mut self) {
        self.hold_timer.stop();
        self.positioning_elapsed = Duration::ZERO;
        self.in_region = false;
        self.grace_elapsed = None;
        self.advance_elapsed = None;
    }
}
