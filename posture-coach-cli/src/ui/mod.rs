// Console formatting shared by the commands

use colored::Colorize;
use posture_coach::models::{PoseComparisonResult, TrainingEvent};

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// One human-readable line per training event
pub fn describe_event(event: &TrainingEvent) -> String {
    match event {
        TrainingEvent::SessionStarted { total_poses, .. } => {
            format!("Session started with {} poses", total_poses)
        }
        TrainingEvent::PositioningCompleted => "Positioning complete".to_string(),
        TrainingEvent::PoseActivated { index, pose_id } => {
            format!("Pose {}: {}", index + 1, pose_id)
        }
        TrainingEvent::MatchStarted { index } => format!("Holding pose {}", index + 1),
        TrainingEvent::MatchLost { index } => format!("Lost pose {}, hold reset", index + 1),
        TrainingEvent::PoseCompleted { index, pose_id } => {
            format!("Pose {} ({}) completed", index + 1, pose_id)
        }
        TrainingEvent::SessionCompleted { .. } => "Session completed".to_string(),
        TrainingEvent::PersonLost => "No person detected".to_string(),
        TrainingEvent::PersonReturned => "Person back in position".to_string(),
        TrainingEvent::PositioningLost => "Positioning lost, back to the first pose".to_string(),
        TrainingEvent::CorrectionHint { message } | TrainingEvent::PositioningHint { message } => {
            message.clone()
        }
        TrainingEvent::SessionStopped => "Session stopped".to_string(),
    }
}

pub fn print_event(timestamp_ms: u64, event: &TrainingEvent) {
    let line = describe_event(event);
    let line = match event {
        TrainingEvent::PoseCompleted { .. } | TrainingEvent::SessionCompleted { .. } => {
            line.green().bold()
        }
        TrainingEvent::MatchStarted { .. } | TrainingEvent::PersonReturned => line.green(),
        TrainingEvent::MatchLost { .. } | TrainingEvent::PersonLost => line.yellow(),
        TrainingEvent::PositioningLost | TrainingEvent::SessionStopped => line.red(),
        TrainingEvent::CorrectionHint { .. } => line.cyan(),
        TrainingEvent::PositioningHint { .. } => line.yellow(),
        _ => line.normal(),
    };
    println!("{:>8} ms  {}", timestamp_ms.to_string().dimmed(), line);
}

pub fn print_comparison(result: &PoseComparisonResult, shape_similarity: f64) {
    let verdict = if result.is_match {
        "MATCH".green().bold()
    } else {
        "NO MATCH".red().bold()
    };

    println!("Pose Comparison");
    println!("────────────────────────────────");
    println!("Similarity: {:.1}%  {}", result.similarity_percentage(), verdict);
    println!("Shape:      {:.1}%", shape_similarity * 100.0);
    println!("Joints compared: {}", result.compared_joints());
    println!();

    for error in result.per_joint_error.values() {
        println!(
            "  {:<16} {:.3}  ({:+.3}, {:+.3})",
            error.joint_name.display_name(),
            error.distance,
            error.direction.dx,
            error.direction.dy
        );
    }

    if !result.feedback_messages.is_empty() {
        println!();
        for message in &result.feedback_messages {
            println!("  {} {}", "→".cyan(), message);
        }
    }
}
