use std::time::Duration;

use crate::config::Config;
use crate::error::TrainingError;
use crate::models::{
    DetectedPerson, FrameAssessment, FrameObservation, PersonStatus, PoseComparisonResult,
    PoseReference, TrainingEvent, TrainingSession, TrainingState,
};
use crate::services::{
    PersonSelector, PersonTracker, PoseComparisonService, PositioningCheck, PositioningService,
    SkeletonNormalizer, TrainingStateMachine,
};

/// What one frame produced
#[derive(Debug, Clone, Default)]
pub struct FrameOutcome {
    pub selected: Option<DetectedPerson>,
    pub comparison: Option<PoseComparisonResult>,
    pub positioning: Option<PositioningCheck>,
    pub events: Vec<TrainingEvent>,
}

/// Per-session frame pipeline: normalize, select, compare, check positioning,
/// then feed the state machine.
#[derive(Debug)]
pub struct TrainingCoordinator {
    normalizer: SkeletonNormalizer,
    tracker: PersonTracker,
    comparator: PoseComparisonService,
    positioning: PositioningService,
    machine: TrainingStateMachine,
    feedback_cooldown: Duration,
    since_last_hint: Option<Duration>,
}

impl TrainingCoordinator {
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: SkeletonNormalizer::new(&config.normalization),
            tracker: PersonTracker::new(PersonSelector::new(&config.selection)),
            comparator: PoseComparisonService::new(config.comparison.clone()),
            positioning: PositioningService::new(config.positioning.clone()),
            machine: TrainingStateMachine::new(config.training.clone(), &config.positioning),
            feedback_cooldown: config.training.feedback_cooldown(),
            since_last_hint: None,
        }
    }

    pub fn start(&mut self, poses: Vec<PoseReference>) -> Result<Vec<TrainingEvent>, TrainingError> {
        self.start_from(poses, 0)
    }

    pub fn start_from(
        &mut self,
        poses: Vec<PoseReference>,
        start_index: usize,
    ) -> Result<Vec<TrainingEvent>, TrainingError> {
        self.tracker.reset();
        self.since_last_hint = None;
        self.machine.start_from(poses, start_index)
    }

    pub fn stop(&mut self) -> Result<Vec<TrainingEvent>, TrainingError> {
        self.tracker.reset();
        self.machine.stop()
    }

    pub fn process_frame(&mut self, frame: &FrameObservation) -> FrameOutcome {
        let people = self.normalizer.normalize_frame(frame);
        let Some(person) = self.tracker.track(&people).cloned() else {
            let events = self.machine.on_frame(FrameAssessment::no_person());
            self.observe(&events);
            return FrameOutcome {
                events,
                ..FrameOutcome::default()
            };
        };

        let positioning = self.positioning.evaluate(&person);
        let comparison = self
            .machine
            .current_reference()
            .map(|reference| self.comparator.compare(&person.skeleton, reference));

        let assessment = FrameAssessment {
            person: if positioning.in_region() {
                PersonStatus::InRegion
            } else {
                PersonStatus::OutOfRegion
            },
            is_match: comparison.as_ref().is_some_and(|c| c.is_match),
        };

        let mut events = self.machine.on_frame(assessment);
        self.observe(&events);
        if self.machine.is_person_confirmed() && self.tracker.is_setup_mode() {
            self.tracker.lock_anchor();
        }

        if let Some(hint) = self.guidance(comparison.as_ref(), &positioning) {
            events.push(hint);
        }

        FrameOutcome {
            selected: Some(person),
            comparison,
            positioning: Some(positioning),
            events,
        }
    }

    pub fn tick(&mut self, elapsed: Duration) -> Vec<TrainingEvent> {
        if let Some(since) = self.since_last_hint.as_mut() {
            *since += elapsed;
        }

        let events = self.machine.tick(elapsed);
        self.observe(&events);
        events
    }

    pub fn state(&self) -> TrainingState {
        self.machine.state()
    }

    pub fn session(&self) -> Option<&TrainingSession> {
        self.machine.session()
    }

    pub fn state_machine(&self) -> &TrainingStateMachine {
        &self.machine
    }

    pub fn is_finished(&self) -> bool {
        !self.machine.is_running()
    }

    fn observe(&mut self, events: &[TrainingEvent]) {
        for event in events {
            match event {
                TrainingEvent::PositioningCompleted => self.tracker.lock_anchor(),
                TrainingEvent::PositioningLost => self.tracker.reset(),
                _ => {}
            }
        }
    }

    /// At most one hint per cooldown. Out of region the positioning hint
    /// wins; otherwise the first correction of a non-matching frame.
    fn guidance(
        &mut self,
        comparison: Option<&PoseComparisonResult>,
        positioning: &PositioningCheck,
    ) -> Option<TrainingEvent> {
        let positioning_hint = || {
            positioning.hint().map(|message| TrainingEvent::PositioningHint {
                message: message.to_string(),
            })
        };

        let hint = match self.machine.state() {
            TrainingState::Positioning => positioning_hint()?,
            TrainingState::AwaitingMatch if !positioning.in_region() => positioning_hint()?,
            TrainingState::AwaitingMatch => {
                let comparison = comparison.filter(|c| !c.is_match)?;
                TrainingEvent::CorrectionHint {
                    message: comparison.feedback_messages.first()?.clone(),
                }
            }
            _ => return None,
        };

        if let Some(since) = self.since_last_hint {
            if since < self.feedback_cooldown {
                return None;
            }
        }

        self.since_last_hint = Some(Duration::ZERO);
        Some(hint)
    }
}
