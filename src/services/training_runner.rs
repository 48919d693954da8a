use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::error::TrainingError;
use crate::models::{FrameObservation, TrainingEvent};
use crate::services::TrainingCoordinator;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Runs a started [`TrainingCoordinator`] on its own task.
///
/// The task is the only writer of the coordinator: periodic ticks and frames
/// are serialized through one `select!` loop, so a hold completing and a match
/// being lost can never interleave.
pub struct TrainingRunner;

impl TrainingRunner {
    /// Spawn the owning task. Events emitted by `coordinator.start` are not
    /// republished; subscribe before submitting frames.
    pub fn spawn(coordinator: TrainingCoordinator, tick_interval: Duration) -> TrainingHandle {
        // One slot: a frame arriving while another is pending is dropped
        let (frame_tx, frame_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = oneshot::channel();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task = tokio::spawn(run(
            coordinator,
            tick_interval,
            frame_rx,
            stop_rx,
            event_tx.clone(),
        ));

        TrainingHandle {
            frames: frame_tx,
            events: event_tx,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

pub struct TrainingHandle {
    frames: mpsc::Sender<FrameObservation>,
    events: broadcast::Sender<TrainingEvent>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<TrainingCoordinator>>,
}

impl TrainingHandle {
    /// Offer a frame without waiting. Returns false if it was dropped.
    pub fn submit_frame(&self, frame: FrameObservation) -> bool {
        match self.frames.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(frame)) => {
                tracing::trace!("Dropping frame {}: previous frame still pending", frame.timestamp_ms);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrainingEvent> {
        self.events.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Stop the session and wait for the task to end. No tick is processed
    /// after this returns.
    pub async fn stop(&mut self) -> Result<TrainingCoordinator, TrainingError> {
        if let Some(stop) = self.stop.take() {
            // The task may already have ended on its own
            let _ = stop.send(());
        }
        self.join().await
    }

    /// Wait for the task to end on its own, e.g. when the session completes
    pub async fn join(&mut self) -> Result<TrainingCoordinator, TrainingError> {
        let task = self.task.take().ok_or(TrainingError::AlreadyStopped)?;
        task.await
            .map_err(|e| TrainingError::TaskFailed(e.to_string()))
    }
}

async fn run(
    mut coordinator: TrainingCoordinator,
    tick_interval: Duration,
    mut frames: mpsc::Receiver<FrameObservation>,
    mut stop: oneshot::Receiver<()>,
    events: broadcast::Sender<TrainingEvent>,
) -> TrainingCoordinator {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    let mut last_tick: Instant = ticker.tick().await;

    tracing::debug!("Training task started");

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => {
                match coordinator.stop() {
                    Ok(stopped) => publish(&events, stopped),
                    Err(e) => tracing::debug!("Stop requested: {}", e),
                }
                break;
            }
            now = ticker.tick() => {
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                publish(&events, coordinator.tick(elapsed));
            }
            Some(frame) = frames.recv() => {
                let outcome = coordinator.process_frame(&frame);
                publish(&events, outcome.events);
            }
        }

        if coordinator.is_finished() {
            tracing::info!("Training session finished, ending task");
            break;
        }
    }

    coordinator
}

fn publish(events: &broadcast::Sender<TrainingEvent>, batch: Vec<TrainingEvent>) {
    for event in batch {
        // No subscribers is fine
        let _ = events.send(event);
    }
}
