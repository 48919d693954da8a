use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::config::load_config;
use crate::ui::print_success;
use posture_coach::models::{FrameObservation, JointName, JointStatus, PoseReference};
use posture_coach::services::{
    FilePoseStore, PersonSelector, PoseStore, SelectionPolicy, SkeletonNormalizer,
};

pub async fn list_poses(dir: &Path) -> Result<()> {
    let store = FilePoseStore::new(dir);
    let infos = store.all_pose_infos()?;

    if infos.is_empty() {
        println!("No poses found in {}", store.dir().display());
        return Ok(());
    }

    println!("Poses in {}", store.dir().display());
    println!("────────────────────────────────");
    for info in infos {
        let image = if info.image_file.is_some() {
            "image".dimmed()
        } else {
            "".normal()
        };
        println!("  {:<24} {:<24} {}", info.pose_id.bold(), info.display_name, image);
    }

    Ok(())
}

pub async fn add_pose(dir: &Path, file: &Path, image: Option<&Path>) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let pose = PoseReference::from_json_str(&json)
        .with_context(|| format!("Invalid reference pose {}", file.display()))?;

    let image = image
        .map(|path| {
            fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))
        })
        .transpose()?;

    let info = FilePoseStore::new(dir).add_pose(&pose, image)?;
    print_success(&format!("Added pose '{}' ({})", info.pose_id, info.display_name));

    Ok(())
}

/// Joint flags applied to a freshly captured pose
pub struct CaptureFlags<'a> {
    pub important: &'a [JointName],
    pub ignored: &'a [JointName],
}

/// Turn the most confident person in a recorded frame into a reference pose
pub async fn capture_pose(
    config_path: Option<&Path>,
    dir: &Path,
    frame_file: &Path,
    pose_id: &str,
    flags: CaptureFlags<'_>,
) -> Result<()> {
    let config = load_config(config_path)?;

    let frame_json = fs::read_to_string(frame_file)
        .with_context(|| format!("Failed to read {}", frame_file.display()))?;
    let frame: FrameObservation =
        serde_json::from_str(&frame_json).context("Failed to parse frame")?;

    let people = SkeletonNormalizer::new(&config.normalization).normalize_frame(&frame);
    let person = PersonSelector::new(&config.selection)
        .select(&people, SelectionPolicy::HighestConfidence)
        .with_context(|| format!("No person detected in {}", frame_file.display()))?;

    let mut pose = PoseReference::from_skeleton(pose_id, &person.skeleton)?;
    for (names, status) in [
        (flags.important, JointStatus::Important),
        (flags.ignored, JointStatus::Ignored),
    ] {
        for name in names {
            if pose.toggle_joint_status(*name, status).is_none() {
                tracing::warn!("Joint {} was not captured; cannot mark it {:?}", name, status);
            }
        }
    }

    let info = FilePoseStore::new(dir).add_pose(&pose, None)?;
    print_success(&format!(
        "Captured pose '{}' ({}) with {} joints",
        info.pose_id,
        info.display_name,
        pose.joints.len()
    ));

    Ok(())
}
