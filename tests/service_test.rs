//! Recording service tests: command handling, snapshot broadcast, and the
//! end-to-end ride flow over a simulated location source.

use ridetrack::location::source::{ChannelLocationSource, SimulatedLocationSource};
use ridetrack::location::types::{LocationEvent, LocationUpdate};
use ridetrack::recording::recorder::RideRecorder;
use ridetrack::recording::service::RecordingService;
use ridetrack::recording::types::{AutoPauseSettings, RecorderConfig, RecordingState, RideFault};
use ridetrack::storage::database::Database;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// A recorder tuned for fast tests: the gate passes after 50 ms.
fn fast_config() -> RecorderConfig {
    RecorderConfig {
        stabilization_delay: Duration::from_millis(50),
        min_moving_duration: Duration::from_millis(10),
        aggregate_write_interval: Duration::from_millis(100),
        ..Default::default()
    }
}

fn settings() -> (watch::Sender<AutoPauseSettings>, watch::Receiver<AutoPauseSettings>) {
    watch::channel(AutoPauseSettings::default())
}

fn riding_source(count: usize) -> SimulatedLocationSource {
    SimulatedLocationSource::straight_line(
        51.5,
        -0.12,
        2e-5,
        count,
        5.0,
        8.0,
        Duration::from_millis(20),
    )
}

#[tokio::test]
async fn full_ride_through_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(Mutex::new(
        Database::open(&dir.path().join("rides.db")).unwrap(),
    ));
    let recorder = RideRecorder::with_database(fast_config(), db.clone());
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(riding_source(200)), settings_rx);

    service.start().await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let snapshot = service.latest();
    assert_eq!(snapshot.state, RecordingState::Recording);
    let session = snapshot.session.expect("live session");
    assert!(session.moving > Duration::ZERO);
    assert!(session.distance_m > 0.0);
    assert!(snapshot.current_speed_ms > 0.0);

    service.pause().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let paused = service.latest();
    assert_eq!(paused.state, RecordingState::ManuallyPaused);
    assert_eq!(paused.current_speed_ms, 0.0);

    service.resume().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(service.latest().state, RecordingState::Recording);

    service.stop().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(service.latest().state, RecordingState::Stopped);

    let saved = service.save().await.expect("ride saved");
    assert!(saved.ended_at.is_some());
    assert!(saved.manual_paused >= Duration::from_millis(80));
    assert!(saved.moving <= saved.elapsed);

    service.shutdown().await;

    let guard = db.lock().unwrap();
    let stored = guard.get_ride(&saved.id).unwrap().unwrap();
    assert!(stored.ended_at.is_some());
    assert!(guard.fix_count(&saved.id).unwrap() > 0);
}

#[tokio::test]
async fn late_subscriber_sees_the_latest_snapshot_immediately() {
    let recorder = RideRecorder::new(fast_config());
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(riding_source(100)), settings_rx);

    service.start().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Subscribe only now: the receiver must already hold a live value
    // without waiting for the next tick
    let late = service.subscribe();
    let snapshot = late.borrow().clone();
    assert_eq!(snapshot.state, RecordingState::Recording);
    assert!(snapshot.session.is_some());

    service.shutdown().await;
}

#[tokio::test]
async fn observers_read_a_consistent_view() {
    let recorder = RideRecorder::new(fast_config());
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(riding_source(100)), settings_rx);

    let a = service.subscribe();
    let b = service.subscribe();

    service.start().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Both observers read the same published value
    assert_eq!(*a.borrow(), *b.borrow());

    service.shutdown().await;
}

#[tokio::test]
async fn save_with_nothing_recorded_returns_none() {
    let recorder = RideRecorder::new(fast_config());
    let source = SimulatedLocationSource::new(Vec::new(), Duration::from_millis(10));
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(source), settings_rx);

    service.start().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // No fix ever arrived: still waiting for a stable clock
    assert_eq!(
        service.latest().state,
        RecordingState::WaitingForStableStart
    );

    service.stop().await;
    assert!(service.save().await.is_none());
    assert_eq!(service.latest().state, RecordingState::Idle);

    service.shutdown().await;
}

#[tokio::test]
async fn commands_invalid_for_state_are_ignored() {
    let recorder = RideRecorder::new(fast_config());
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(riding_source(10)), settings_rx);

    service.pause().await;
    service.resume().await;
    service.stop().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(service.latest().state, RecordingState::Idle);

    service.shutdown().await;
}

#[tokio::test]
async fn signal_loss_is_a_soft_indicator_not_an_error() {
    let (events_tx, source) = ChannelLocationSource::new();
    let recorder = RideRecorder::new(fast_config());
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(source), settings_rx);

    service.start().await;
    events_tx
        .send(LocationEvent::Fix(LocationUpdate::new(51.5, -0.12, 5.0, 8.0)))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(service.latest().state, RecordingState::Recording);

    // Into the tunnel: the ride carries on, only the indicator flips
    events_tx.send(LocationEvent::SignalLost).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = service.latest();
    assert!(snapshot.gps_degraded);
    assert_eq!(snapshot.state, RecordingState::Recording);
    assert!(snapshot.fault.is_none());

    // And clears on the next good fix
    events_tx
        .send(LocationEvent::Fix(LocationUpdate::new(
            51.5001, -0.12, 5.0, 8.0,
        )))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!service.latest().gps_degraded);

    service.shutdown().await;
}

#[tokio::test]
async fn permission_loss_surfaces_as_a_fault() {
    let mut events: Vec<LocationEvent> = (0..10)
        .map(|i| {
            LocationEvent::Fix(LocationUpdate::new(
                51.5 + 2e-5 * i as f64,
                -0.12,
                5.0,
                8.0,
            ))
        })
        .collect();
    events.push(LocationEvent::PermissionDenied);

    let source = SimulatedLocationSource::new(events, Duration::from_millis(20));
    let recorder = RideRecorder::new(fast_config());
    let (_settings_tx, settings_rx) = settings();
    let service = RecordingService::spawn(recorder, Box::new(source), settings_rx);

    service.start().await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let snapshot = service.latest();
    assert_eq!(snapshot.state, RecordingState::Stopped);
    assert_eq!(snapshot.fault, Some(RideFault::PermissionRequired));
    // Captured aggregates survive for the caller to inspect
    assert!(snapshot.session.is_some());

    service.shutdown().await;
}
