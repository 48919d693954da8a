use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::load_config;
use crate::ui::{print_comparison, print_failure};
use posture_coach::models::{FrameObservation, PoseReference};
use posture_coach::services::{
    PersonSelector, PoseComparisonService, SelectionPolicy, SkeletonNormalizer,
};

#[derive(Args)]
pub struct CompareCommand {
    /// Reference pose JSON file
    #[arg(short, long)]
    reference: PathBuf,

    /// Recorded detector frame (JSON)
    #[arg(short, long)]
    frame: PathBuf,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
}

impl CompareCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;

        let reference_json = fs::read_to_string(&self.reference)
            .with_context(|| format!("Failed to read {}", self.reference.display()))?;
        let reference = PoseReference::from_json_str(&reference_json)
            .with_context(|| format!("Invalid reference pose {}", self.reference.display()))?;

        let frame_json = fs::read_to_string(&self.frame)
            .with_context(|| format!("Failed to read {}", self.frame.display()))?;
        let frame: FrameObservation =
            serde_json::from_str(&frame_json).context("Failed to parse frame")?;

        let people = SkeletonNormalizer::new(&config.normalization).normalize_frame(&frame);
        let selector = PersonSelector::new(&config.selection);

        let Some(person) = selector.select(&people, SelectionPolicy::HighestConfidence) else {
            if self.json {
                println!("{}", json!({ "person_detected": false }));
            } else {
                print_failure("No person detected");
            }
            return Ok(());
        };

        let comparator = PoseComparisonService::new(config.comparison.clone());
        let result = comparator.compare(&person.skeleton, &reference);
        let shape = comparator.shape_similarity(&person.skeleton, &reference);

        if self.json {
            let output = json!({
                "person_detected": true,
                "pose_id": reference.pose_id,
                "overall_similarity": result.overall_similarity,
                "shape_similarity": shape,
                "is_match": result.is_match,
                "per_joint_error": result.per_joint_error,
                "feedback_messages": result.feedback_messages,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_comparison(&result, shape);
        }

        Ok(())
    }
}
