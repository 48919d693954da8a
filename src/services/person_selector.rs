use crate::config::SelectionConfig;
use crate::models::{DetectedPerson, Point};

/// How to pick one body out of several detected in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Used while setting up: the most certain detection wins
    HighestConfidence,
    /// Used once a person is confirmed: the body closest to the anchor wins
    NearestToAnchor(Point),
}

#[derive(Debug, Clone)]
pub struct PersonSelector {
    centroid_min_confidence: f64,
}

impl PersonSelector {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            centroid_min_confidence: config.centroid_min_confidence,
        }
    }

    /// Pick at most one candidate. Ties go to the earliest candidate.
    pub fn select<'a>(
        &self,
        candidates: &'a [DetectedPerson],
        policy: SelectionPolicy,
    ) -> Option<&'a DetectedPerson> {
        let mut best: Option<(&DetectedPerson, f64)> = None;

        for candidate in candidates {
            // Lower score is better for both policies
            let score = match policy {
                SelectionPolicy::HighestConfidence => -candidate.confidence,
                SelectionPolicy::NearestToAnchor(anchor) => {
                    self.centroid_of(candidate).distance_to(&anchor)
                }
            };

            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best.map(|(candidate, _)| candidate)
    }

    pub fn centroid_of(&self, person: &DetectedPerson) -> Point {
        person.centroid(self.centroid_min_confidence)
    }
}

/// Keeps following the same individual across frames.
///
/// In setup mode the most confident body is picked and its centroid recorded.
/// After [`PersonTracker::lock_anchor`] the body nearest to the last recorded
/// centroid is picked, so a second person entering the frame is ignored.
#[derive(Debug, Clone)]
pub struct PersonTracker {
    selector: PersonSelector,
    anchor: Option<Point>,
    locked: bool,
}

impl PersonTracker {
    pub fn new(selector: PersonSelector) -> Self {
        Self {
            selector,
            anchor: None,
            locked: false,
        }
    }

    pub fn is_setup_mode(&self) -> bool {
        !self.locked
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn policy(&self) -> SelectionPolicy {
        match (self.locked, self.anchor) {
            (true, Some(anchor)) => SelectionPolicy::NearestToAnchor(anchor),
            _ => SelectionPolicy::HighestConfidence,
        }
    }

    /// Select the tracked person for this frame and move the anchor to them
    pub fn track<'a>(&mut self, candidates: &'a [DetectedPerson]) -> Option<&'a DetectedPerson> {
        let selected = self.selector.select(candidates, self.policy())?;
        self.anchor = Some(self.selector.centroid_of(selected));
        Some(selected)
    }

    /// Switch to nearest-to-anchor selection. No-op until an anchor exists.
    pub fn lock_anchor(&mut self) {
        if self.anchor.is_some() {
            tracing::debug!("Person anchor locked at {:?}", self.anchor);
            self.locked = true;
        }
    }

    pub fn reset(&mut self) {
        self.anchor = None;
        self.locked = false;
    }
}
