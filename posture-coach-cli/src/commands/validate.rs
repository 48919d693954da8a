use anyhow::{bail, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::ui::{print_failure, print_success};
use posture_coach::models::PoseReference;

#[derive(Args)]
pub struct ValidateCommand {
    /// Reference pose JSON files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl ValidateCommand {
    pub async fn execute(self) -> Result<()> {
        let mut failures = 0;

        for file in &self.files {
            let result = fs::read_to_string(file)
                .map_err(anyhow::Error::from)
                .and_then(|json| Ok(PoseReference::from_json_str(&json)?));

            match result {
                Ok(pose) => print_success(&format!(
                    "{}: '{}' with {} joints ({} comparable)",
                    file.display(),
                    pose.pose_id,
                    pose.joints.len(),
                    pose.comparable_joints().count()
                )),
                Err(e) => {
                    failures += 1;
                    print_failure(&format!("{}: {}", file.display(), e));
                }
            }
        }

        if failures > 0 {
            bail!("{} of {} pose files failed validation", failures, self.files.len());
        }
        Ok(())
    }
}
