//! Recording service: the single owner of the live recorder.
//!
//! One tokio task serializes the three event sources that mutate a session
//! (user commands, location events, the periodic tick) and broadcasts
//! snapshots through a watch cell, so any number of observers read a
//! consistent view and late subscribers get the latest value immediately.

use crate::location::source::LocationSource;
use crate::recording::recorder::RideRecorder;
use crate::recording::types::{AutoPauseSettings, LiveSnapshot, RideSession};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, watch};

/// Commands accepted by the recording service.
///
/// Commands invalid for the current state are ignored, not errors.
#[derive(Debug)]
pub enum RideCommand {
    /// Begin a new session
    Start,
    /// Pause the session by user request
    Pause,
    /// Resume from a manual pause
    Resume,
    /// Stop the session, keeping it for save or discard
    Stop,
    /// Persist the stopped session; replies with the finalized aggregate
    Save(oneshot::Sender<Option<RideSession>>),
    /// Delete the stopped session and its fixes
    Discard,
    /// Shut the service down
    Shutdown,
}

/// Interval of the duration-bookkeeping tick.
///
/// Decoupled from the fix arrival rate so the clock advances smoothly for
/// observers even when no position data is flowing.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running recording service.
pub struct RecordingService {
    commands: mpsc::Sender<RideCommand>,
    snapshots: watch::Receiver<LiveSnapshot>,
    handle: tokio::task::JoinHandle<()>,
}

impl RecordingService {
    /// Spawn the service task around a recorder and a location source.
    ///
    /// `settings` carries auto-pause preference changes; they take effect
    /// on the next loop iteration without restarting the session.
    pub fn spawn(
        recorder: RideRecorder,
        mut source: Box<dyn LocationSource>,
        settings: watch::Receiver<AutoPauseSettings>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(recorder.snapshot());
        let events = source.events();

        let handle = tokio::spawn(run(recorder, events, cmd_rx, snapshot_tx, settings));

        Self {
            commands: cmd_tx,
            snapshots: snapshot_rx,
            handle,
        }
    }

    /// Subscribe to live snapshots. The receiver immediately holds the
    /// latest published value.
    pub fn subscribe(&self) -> watch::Receiver<LiveSnapshot> {
        self.snapshots.clone()
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> LiveSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Send a command to the service.
    pub async fn command(&self, command: RideCommand) {
        if self.commands.send(command).await.is_err() {
            tracing::warn!("Recording service is gone; command dropped");
        }
    }

    /// Start a new session.
    pub async fn start(&self) {
        self.command(RideCommand::Start).await;
    }

    /// Pause the session.
    pub async fn pause(&self) {
        self.command(RideCommand::Pause).await;
    }

    /// Resume from a manual pause.
    pub async fn resume(&self) {
        self.command(RideCommand::Resume).await;
    }

    /// Stop the session.
    pub async fn stop(&self) {
        self.command(RideCommand::Stop).await;
    }

    /// Save the stopped session; returns the finalized aggregate, or None
    /// if there was nothing to save.
    pub async fn save(&self) -> Option<RideSession> {
        let (tx, rx) = oneshot::channel();
        self.command(RideCommand::Save(tx)).await;
        rx.await.ok().flatten()
    }

    /// Discard the stopped session.
    pub async fn discard(&self) {
        self.command(RideCommand::Discard).await;
    }

    /// Shut the service down and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(RideCommand::Shutdown).await;
        let _ = self.handle.await;
    }
}

async fn run(
    mut recorder: RideRecorder,
    mut events: futures::stream::BoxStream<'static, crate::location::types::LocationEvent>,
    mut commands: mpsc::Receiver<RideCommand>,
    snapshots: watch::Sender<LiveSnapshot>,
    mut settings: watch::Receiver<AutoPauseSettings>,
) {
    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut source_done = false;

    tracing::info!("Recording service started");

    loop {
        // Preference changes apply before whatever fires next
        if settings.has_changed().unwrap_or(false) {
            let updated = *settings.borrow_and_update();
            recorder.set_auto_pause(updated, Instant::now());
        }

        let consuming = recorder.consumes_fixes();

        // Commands win over data so a pause halts consumption before the
        // next tick can observe a half-updated accumulator
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else { break };
                let now = Instant::now();
                match command {
                    RideCommand::Start => recorder.start(now),
                    RideCommand::Pause => recorder.pause(now),
                    RideCommand::Resume => recorder.resume(now),
                    RideCommand::Stop => recorder.stop(now),
                    RideCommand::Save(reply) => {
                        let saved = match recorder.save(now) {
                            Ok(session) => Some(session),
                            Err(e) => {
                                tracing::debug!("Save declined: {e}");
                                None
                            }
                        };
                        let _ = reply.send(saved);
                    }
                    RideCommand::Discard => recorder.discard(),
                    RideCommand::Shutdown => break,
                }
            }

            event = events.next(), if consuming && !source_done => {
                match event {
                    Some(event) => recorder.handle_event(event, Instant::now()),
                    None => {
                        // Source ended; ticks and commands keep running
                        tracing::debug!("Location source stream ended");
                        source_done = true;
                    }
                }
            }

            _ = tick.tick() => {
                recorder.tick(Instant::now());
            }
        }

        snapshots.send_replace(recorder.snapshot());
    }

    tracing::info!("Recording service stopped");
}
