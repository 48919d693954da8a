use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::load_config;
use crate::ui::print_event;
use posture_coach::models::{FrameObservation, TrainingEvent};
use posture_coach::services::{load_sequence, FilePoseStore, PoseStore, TrainingCoordinator};

#[derive(Args)]
pub struct ReplayCommand {
    /// Pose directory
    #[arg(short, long)]
    dir: PathBuf,

    /// Recorded frames, one JSON observation per line
    #[arg(short, long)]
    frames: PathBuf,

    /// Pose ids to train, in order (default: every pose in the directory)
    #[arg(short, long, value_delimiter = ',')]
    poses: Vec<String>,

    /// Begin at this position in the training list (0-based)
    #[arg(long, default_value = "0")]
    start_index: usize,

    /// Keep the clock running this long after the last frame
    #[arg(long, default_value = "0")]
    settle_ms: u64,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

impl ReplayCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let store = FilePoseStore::new(&self.dir);

        let poses = if self.poses.is_empty() {
            store.all_poses()?
        } else {
            load_sequence(&store, &self.poses)?
        };

        let frames = read_frames(&self.frames)?;
        let Some(first) = frames.first() else {
            bail!("No frames in {}", self.frames.display());
        };

        let mut coordinator = TrainingCoordinator::new(&config);
        let tick = config.training.tick_interval();
        let tick_ms = config.training.tick_interval_ms;

        let start_ms = first.timestamp_ms;
        self.emit(start_ms, coordinator.start_from(poses, self.start_index)?);

        // Simulated clock: ticks are delivered at fixed steps between frame timestamps
        let mut next_tick_ms = start_ms + tick_ms;
        for frame in &frames {
            while next_tick_ms <= frame.timestamp_ms && !coordinator.is_finished() {
                self.emit(next_tick_ms, coordinator.tick(tick));
                next_tick_ms += tick_ms;
            }
            if coordinator.is_finished() {
                break;
            }

            let outcome = coordinator.process_frame(frame);
            self.emit(frame.timestamp_ms, outcome.events);
        }

        let end_ms = frames.last().map_or(start_ms, |f| f.timestamp_ms) + self.settle_ms;
        while next_tick_ms <= end_ms && !coordinator.is_finished() {
            self.emit(next_tick_ms, coordinator.tick(tick));
            next_tick_ms += tick_ms;
        }

        if let Some(session) = coordinator.session() {
            tracing::info!(
                "Replay finished: {}/{} poses completed",
                session.completed_indices().len(),
                session.total_poses()
            );
        }

        Ok(())
    }

    fn emit(&self, timestamp_ms: u64, events: Vec<TrainingEvent>) {
        for event in events {
            if self.json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::error!("Failed to serialize event: {}", e),
                }
            } else {
                print_event(timestamp_ms, &event);
            }
        }
    }
}

/// Read a JSON Lines recording; blank lines are skipped
fn read_frames(path: &Path) -> Result<Vec<FrameObservation>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut frames: Vec<FrameObservation> = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame on line {}", number + 1))?;
        frames.push(frame);
    }

    if frames.windows(2).any(|pair| pair[1].timestamp_ms < pair[0].timestamp_ms) {
        tracing::warn!("Frames are not in timestamp order; sorting");
        frames.sort_by_key(|frame| frame.timestamp_ms);
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_frames_skips_blank_lines_and_sorts() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"timestampMs": 200, "bodies": []}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"timestampMs": 100}}"#).unwrap();

        let frames = read_frames(file.path()).unwrap();
        let stamps: Vec<u64> = frames.iter().map(|f| f.timestamp_ms).collect();
        assert_eq!(stamps, vec![100, 200]);
    }

    #[test]
    fn test_read_frames_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"timestampMs": 0}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let err = read_frames(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
