//! Database tests for ride and fix persistence.

use chrono::{Duration as ChronoDuration, Utc};
use ridetrack::location::types::LocationUpdate;
use ridetrack::recording::types::{PauseKind, PositionFix, RideSession};
use ridetrack::storage::database::Database;
use std::time::Duration;

fn started_session() -> RideSession {
    let mut session = RideSession::new();
    session.started_at = Some(Utc::now());
    session
}

fn sample_fix(lat: f64, lon: f64, speed: f64) -> PositionFix {
    PositionFix::from_update(&LocationUpdate::new(lat, lon, speed, 8.0), PauseKind::None)
}

#[test]
fn insert_and_get_ride_roundtrip() {
    let db = Database::open_in_memory().unwrap();

    let mut session = started_session();
    session.elapsed = Duration::from_secs(125);
    session.moving = Duration::from_secs(100);
    session.manual_paused = Duration::from_secs(25);
    session.distance_m = 512.5;
    session.average_speed_ms = 5.125;
    session.max_speed_ms = 9.2;

    db.insert_ride(&session).unwrap();

    let stored = db.get_ride(&session.id).unwrap().unwrap();
    assert_eq!(stored.id, session.id);
    assert_eq!(stored.elapsed, session.elapsed);
    assert_eq!(stored.moving, session.moving);
    assert_eq!(stored.manual_paused, session.manual_paused);
    assert_eq!(stored.auto_paused, Duration::ZERO);
    assert!((stored.distance_m - 512.5).abs() < 1e-9);
    assert!((stored.max_speed_ms - 9.2).abs() < 1e-9);
    assert!(stored.ended_at.is_none());
}

#[test]
fn insert_requires_a_start_time() {
    let db = Database::open_in_memory().unwrap();
    let session = RideSession::new();

    assert!(db.insert_ride(&session).is_err());
}

#[test]
fn get_missing_ride_returns_none() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_ride(&uuid::Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn update_aggregate_rewrites_statistics() {
    let db = Database::open_in_memory().unwrap();
    let mut session = started_session();
    db.insert_ride(&session).unwrap();

    session.elapsed = Duration::from_secs(60);
    session.moving = Duration::from_secs(55);
    session.distance_m = 300.0;
    db.update_ride_aggregate(&session).unwrap();

    let stored = db.get_ride(&session.id).unwrap().unwrap();
    assert_eq!(stored.moving, Duration::from_secs(55));
    assert!((stored.distance_m - 300.0).abs() < 1e-9);
}

#[test]
fn finalize_sets_the_end_marker() {
    let db = Database::open_in_memory().unwrap();
    let mut session = started_session();
    db.insert_ride(&session).unwrap();

    // Finalizing without an end time is a caller defect
    assert!(db.finalize_ride(&session).is_err());

    session.ended_at = Some(Utc::now() + ChronoDuration::seconds(90));
    db.finalize_ride(&session).unwrap();

    let stored = db.get_ride(&session.id).unwrap().unwrap();
    assert!(stored.ended_at.is_some());
}

#[test]
fn incomplete_listing_only_returns_unfinished_rides() {
    let db = Database::open_in_memory().unwrap();

    let unfinished = started_session();
    db.insert_ride(&unfinished).unwrap();

    let mut finished = started_session();
    db.insert_ride(&finished).unwrap();
    finished.ended_at = Some(Utc::now());
    db.finalize_ride(&finished).unwrap();

    let incomplete = db.list_incomplete_rides().unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].id, unfinished.id);

    assert_eq!(db.list_rides().unwrap().len(), 2);
}

#[test]
fn fix_batches_append_in_order() {
    let mut db = Database::open_in_memory().unwrap();
    let session = started_session();
    db.insert_ride(&session).unwrap();

    let first: Vec<PositionFix> = (0..16)
        .map(|i| sample_fix(51.5 + 0.0001 * i as f64, -0.12, 5.0))
        .collect();
    let second: Vec<PositionFix> = (16..24)
        .map(|i| sample_fix(51.5 + 0.0001 * i as f64, -0.12, 4.0))
        .collect();

    db.append_fixes(&session.id, &first).unwrap();
    db.append_fixes(&session.id, &second).unwrap();
    db.append_fixes(&session.id, &[]).unwrap();

    assert_eq!(db.fix_count(&session.id).unwrap(), 24);

    let fixes = db.fixes_for_ride(&session.id).unwrap();
    assert_eq!(fixes.len(), 24);
    for (i, fix) in fixes.iter().enumerate() {
        assert!((fix.latitude - (51.5 + 0.0001 * i as f64)).abs() < 1e-9);
    }

    let last = db.last_fix_for_ride(&session.id).unwrap().unwrap();
    assert!((last.latitude - fixes[23].latitude).abs() < 1e-9);
}

#[test]
fn deleting_a_ride_cascades_to_its_fixes() {
    let mut db = Database::open_in_memory().unwrap();
    let session = started_session();
    db.insert_ride(&session).unwrap();

    let fixes: Vec<PositionFix> = (0..8).map(|_| sample_fix(51.5, -0.12, 5.0)).collect();
    db.append_fixes(&session.id, &fixes).unwrap();
    assert_eq!(db.fix_count(&session.id).unwrap(), 8);

    db.delete_ride(&session.id).unwrap();

    assert!(db.get_ride(&session.id).unwrap().is_none());
    assert_eq!(db.fix_count(&session.id).unwrap(), 0);
}

#[test]
fn both_pause_flags_set_is_rejected_by_the_schema() {
    let mut db = Database::open_in_memory().unwrap();
    let session = started_session();
    db.insert_ride(&session).unwrap();

    let mut bad = sample_fix(51.5, -0.12, 0.0);
    bad.manual_paused = true;
    bad.auto_paused = true;

    assert!(db.append_fixes(&session.id, &[bad]).is_err());
    // The failed batch left nothing behind
    assert_eq!(db.fix_count(&session.id).unwrap(), 0);
}

#[test]
fn pause_flags_roundtrip() {
    let mut db = Database::open_in_memory().unwrap();
    let session = started_session();
    db.insert_ride(&session).unwrap();

    let update = LocationUpdate::new(51.5, -0.12, 0.0, 8.0);
    let fixes = [
        PositionFix::from_update(&update, PauseKind::None),
        PositionFix::from_update(&update, PauseKind::Auto),
        PositionFix::from_update(&update, PauseKind::Manual),
    ];
    db.append_fixes(&session.id, &fixes).unwrap();

    let stored = db.fixes_for_ride(&session.id).unwrap();
    assert!(!stored[0].manual_paused && !stored[0].auto_paused);
    assert!(!stored[1].manual_paused && stored[1].auto_paused);
    assert!(stored[2].manual_paused && !stored[2].auto_paused);
}
