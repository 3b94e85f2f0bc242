//! Export tests for GPX and CSV output.

use chrono::Utc;
use ridetrack::location::types::LocationUpdate;
use ridetrack::recording::types::{PauseKind, PositionFix, RideSession};
use ridetrack::recording::{exporter_csv, exporter_gpx};
use std::time::Duration;

fn finished_session() -> RideSession {
    let mut session = RideSession::new();
    session.started_at = Some(Utc::now());
    session.ended_at = Some(Utc::now());
    session.elapsed = Duration::from_secs(600);
    session.moving = Duration::from_secs(540);
    session.manual_paused = Duration::from_secs(60);
    session.distance_m = 2700.0;
    session.average_speed_ms = 5.0;
    session.max_speed_ms = 8.5;
    session
}

fn fix_at(lat: f64, pause: PauseKind) -> PositionFix {
    PositionFix::from_update(&LocationUpdate::new(lat, -0.12, 5.0, 8.0), pause)
}

#[test]
fn gpx_contains_track_points() {
    let session = finished_session();
    let fixes = vec![
        fix_at(51.5000, PauseKind::None),
        fix_at(51.5002, PauseKind::None),
        fix_at(51.5004, PauseKind::None),
    ];

    let gpx = exporter_gpx::export_gpx(&session, &fixes).unwrap();

    assert!(gpx.starts_with("<?xml"));
    assert!(gpx.contains("<gpx"));
    assert!(gpx.contains("version=\"1.1\""));
    assert_eq!(gpx.matches("<trkpt").count(), 3);
    assert!(gpx.contains("lat=\"51.5000000\""));
    assert!(gpx.contains("lon=\"-0.1200000\""));
    assert!(gpx.contains("<speed>5.00</speed>"));
}

#[test]
fn gpx_splits_segments_at_pause_boundaries() {
    let session = finished_session();
    let fixes = vec![
        fix_at(51.5000, PauseKind::None),
        fix_at(51.5002, PauseKind::None),
        // Stationary stretch under auto-pause
        fix_at(51.5002, PauseKind::Auto),
        fix_at(51.5002, PauseKind::Auto),
        // Riding again
        fix_at(51.5004, PauseKind::None),
        fix_at(51.5006, PauseKind::None),
    ];

    let gpx = exporter_gpx::export_gpx(&session, &fixes).unwrap();

    // One segment ends where riding resumes
    assert_eq!(gpx.matches("<trkseg>").count(), 2);
    assert_eq!(gpx.matches("</trkseg>").count(), 2);
    assert_eq!(gpx.matches("<trkpt").count(), 6);
}

#[test]
fn gpx_requires_data_and_a_start_time() {
    let session = finished_session();
    assert!(exporter_gpx::export_gpx(&session, &[]).is_err());

    let mut unstarted = finished_session();
    unstarted.started_at = None;
    let fixes = vec![fix_at(51.5, PauseKind::None)];
    assert!(exporter_gpx::export_gpx(&unstarted, &fixes).is_err());
}

#[test]
fn csv_dumps_one_row_per_fix() {
    let fixes = vec![
        fix_at(51.5000, PauseKind::None),
        fix_at(51.5002, PauseKind::Manual),
        fix_at(51.5004, PauseKind::Auto),
    ];

    let csv = exporter_csv::export_csv(&fixes).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("captured_at,latitude,longitude"));
    assert!(lines[1].ends_with(",0,0"));
    assert!(lines[2].ends_with(",1,0"));
    assert!(lines[3].ends_with(",0,1"));

    assert!(exporter_csv::export_csv(&[]).is_err());
}

#[test]
fn summary_csv_has_the_aggregates() {
    let session = finished_session();
    let csv = exporter_csv::export_summary_csv(&session).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(&session.id.to_string()));
    assert!(lines[1].contains(",600,"));
    assert!(lines[1].contains(",540,"));
    assert!(lines[1].contains("2700.0"));
}
