//! RideTrack - GPS Ride Recording Engine
//!
//! Demo entry point: recovers interrupted rides, then replays a scripted
//! ride through the full recording stack and saves it.

use anyhow::Context;
use ridetrack::location::source::SimulatedLocationSource;
use ridetrack::recording::recovery;
use ridetrack::recording::types::RecorderConfig;
use ridetrack::recording::{exporter_gpx, RecordingService, RideRecorder};
use ridetrack::storage::config;
use ridetrack::storage::database::Database;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RideTrack v{}", env!("CARGO_PKG_VERSION"));

    let app_config = config::load_config().context("loading configuration")?;
    let database = Database::open(&app_config.database_path()).context("opening ride database")?;
    let database = Arc::new(Mutex::new(database));

    // Offer interrupted rides for recovery before anything else
    {
        let guard = database
            .lock()
            .map_err(|e| anyhow::anyhow!("database lock poisoned: {e}"))?;
        let incomplete = recovery::list_incomplete(&guard)?;
        for ride in &incomplete {
            tracing::warn!(
                ride = %ride.session.id,
                last_fix_at = ?ride.last_fix_at,
                "Found interrupted ride, finalizing from last known fix"
            );
            recovery::recover(&guard, &ride.session.id)?;
        }
    }

    // Scripted ride: ~5.5 m/s heading north, accelerated playback
    let source = SimulatedLocationSource::straight_line(
        60.1699,
        24.9384,
        1.2e-5,
        80,
        5.5,
        8.0,
        Duration::from_millis(250),
    );

    let (_settings_tx, settings_rx) = watch::channel(app_config.recording.auto_pause);
    let recorder = RideRecorder::with_database(RecorderConfig::default(), database.clone());
    let service = RecordingService::spawn(recorder, Box::new(source), settings_rx);

    let mut snapshots = service.subscribe();

    service.start().await;

    // Narrate the live view once a second while the ride plays out
    let narrator = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if snapshots.changed().await.is_err() {
                break;
            }
            let snapshot = snapshots.borrow_and_update().clone();
            if let Some(session) = &snapshot.session {
                tracing::info!(
                    state = ?snapshot.state,
                    moving_s = session.moving.as_secs(),
                    distance_m = format!("{:.0}", session.distance_m),
                    speed_ms = format!("{:.1}", snapshot.current_speed_ms),
                    "ride"
                );
            }
        }
    });

    tokio::time::sleep(Duration::from_secs(8)).await;
    service.pause().await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    service.resume().await;
    tokio::time::sleep(Duration::from_secs(8)).await;
    service.stop().await;

    let saved = service.save().await;
    service.shutdown().await;
    narrator.abort();

    let Some(session) = saved else {
        tracing::warn!("Nothing was recorded");
        return Ok(());
    };

    println!("{}", serde_json::to_string_pretty(&session)?);

    // Drop a GPX track next to the database
    let guard = database
        .lock()
        .map_err(|e| anyhow::anyhow!("database lock poisoned: {e}"))?;
    let fixes = guard.fixes_for_ride(&session.id)?;
    drop(guard);

    let gpx = exporter_gpx::export_gpx(&session, &fixes)?;
    let gpx_path = app_config.data_dir.join(format!("{}.gpx", session.id));
    std::fs::write(&gpx_path, gpx).context("writing GPX export")?;
    tracing::info!("Wrote {}", gpx_path.display());

    Ok(())
}
