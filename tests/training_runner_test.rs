mod common;

use assert_matches::assert_matches;
use common::*;
use posture_coach::error::TrainingError;
use posture_coach::models::{TrainingEvent, TrainingState};
use posture_coach::services::{TrainingCoordinator, TrainingRunner};
use std::time::Duration;
use tokio::sync::broadcast;

fn started_coordinator() -> TrainingCoordinator {
    let mut config = test_config();
    config.training.require_positioning = false;
    let mut coordinator = TrainingCoordinator::new(&config);
    coordinator.start(vec![t_pose()]).unwrap();
    coordinator
}

async fn next_event(events: &mut broadcast::Receiver<TrainingEvent>) -> TrainingEvent {
    tokio::time::timeout(Duration::from_secs(30), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test(start_paused = true)]
async fn test_runner_completes_session_in_real_time() {
    let mut handle = TrainingRunner::spawn(started_coordinator(), TICK);
    let mut events = handle.subscribe();

    assert!(handle.submit_frame(t_pose_frame(0)));
    assert_eq!(next_event(&mut events).await, TrainingEvent::MatchStarted { index: 0 });

    let started = tokio::time::Instant::now();
    assert_matches!(next_event(&mut events).await, TrainingEvent::PoseCompleted { index: 0, .. });
    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_matches!(next_event(&mut events).await, TrainingEvent::SessionCompleted { .. });

    let coordinator = handle.join().await.unwrap();
    assert_eq!(coordinator.state(), TrainingState::Completed);
    assert!(handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_frames_are_dropped_while_one_is_pending() {
    let mut handle = TrainingRunner::spawn(started_coordinator(), TICK);

    // The task has not run yet, so the single slot stays occupied
    assert!(handle.submit_frame(relaxed_frame(0)));
    assert!(!handle.submit_frame(relaxed_frame(33)));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handle.submit_frame(relaxed_frame(66)));

    handle.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_task_and_timers() {
    let mut handle = TrainingRunner::spawn(started_coordinator(), TICK);
    let mut events = handle.subscribe();

    handle.submit_frame(t_pose_frame(0));
    assert_eq!(next_event(&mut events).await, TrainingEvent::MatchStarted { index: 0 });

    let coordinator = handle.stop().await.unwrap();
    assert_eq!(coordinator.state(), TrainingState::Idle);
    assert_eq!(next_event(&mut events).await, TrainingEvent::SessionStopped);

    // Nothing fires after stop, even long past the hold duration
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_matches!(events.try_recv(), Err(broadcast::error::TryRecvError::Empty));

    assert!(!handle.submit_frame(t_pose_frame(5000)));
    assert_matches!(handle.stop().await, Err(TrainingError::AlreadyStopped));
}
