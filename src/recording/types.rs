//! Recording types for ride sessions and position fixes.

use crate::location::types::LocationUpdate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Speed below which a rider is considered stationary (1 km/h).
pub const STATIONARY_CUTOFF_MS: f64 = 0.278;

/// State of the ride recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordingState {
    /// No session active
    #[default]
    Idle,
    /// Start issued, waiting for the clock to stabilize on a usable fix
    WaitingForStableStart,
    /// Actively recording
    Recording,
    /// Paused by the user; fix consumption halted
    ManuallyPaused,
    /// Paused automatically after sustained stationary speed; fixes still flow
    AutoPaused,
    /// Stopped, awaiting save or discard
    Stopped,
}

impl RecordingState {
    /// Whether a session is live in this state.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RecordingState::WaitingForStableStart
                | RecordingState::Recording
                | RecordingState::ManuallyPaused
                | RecordingState::AutoPaused
        )
    }
}

/// Which pause interval a fix was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseKind {
    /// Not paused
    #[default]
    None,
    /// User-initiated pause
    Manual,
    /// Stationary-detection pause
    Auto,
}

/// A validated position fix belonging to a ride session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Instantaneous speed in m/s, clamped non-negative
    pub speed_ms: f64,
    /// Accuracy radius in meters
    pub accuracy_m: f64,
    /// Capture timestamp from the receiver
    pub captured_at: DateTime<Utc>,
    /// Captured during a manual pause
    pub manual_paused: bool,
    /// Captured during an auto-pause
    pub auto_paused: bool,
}

impl PositionFix {
    /// Build a fix from a raw update, tagging it with the current pause kind.
    ///
    /// Taking a single [`PauseKind`] keeps the two flags mutually exclusive
    /// by construction.
    pub fn from_update(update: &LocationUpdate, pause: PauseKind) -> Self {
        Self {
            latitude: update.latitude,
            longitude: update.longitude,
            speed_ms: update.speed_ms.max(0.0),
            accuracy_m: update.accuracy_m,
            captured_at: update.captured_at,
            manual_paused: pause == PauseKind::Manual,
            auto_paused: pause == PauseKind::Auto,
        }
    }
}

/// A ride session's aggregate statistics.
///
/// Exclusively owned and mutated by the recorder; everything else sees
/// cloned snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideSession {
    /// Unique identifier, assigned when recording starts
    pub id: Uuid,
    /// Wall-clock start, unset until the stabilization gate passes.
    ///
    /// Never used for duration math while unset.
    pub started_at: Option<DateTime<Utc>>,
    /// Wall-clock end; the finalize marker. A persisted session without it
    /// is incomplete and eligible for crash recovery.
    pub ended_at: Option<DateTime<Utc>>,
    /// Time since start, inclusive of all pauses
    pub elapsed: Duration,
    /// Elapsed minus all paused time; average-speed denominator
    pub moving: Duration,
    /// Total user-initiated pause time
    pub manual_paused: Duration,
    /// Total stationary-detection pause time
    pub auto_paused: Duration,
    /// Total distance in meters
    pub distance_m: f64,
    /// Distance over moving time, in m/s
    pub average_speed_ms: f64,
    /// Highest gated instantaneous speed seen, in m/s
    pub max_speed_ms: f64,
    /// Record creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RideSession {
    /// Create an empty session. All accumulators zero, start unset.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: None,
            ended_at: None,
            elapsed: Duration::ZERO,
            moving: Duration::ZERO,
            manual_paused: Duration::ZERO,
            auto_paused: Duration::ZERO,
            distance_m: 0.0,
            average_speed_ms: 0.0,
            max_speed_ms: 0.0,
            created_at: Utc::now(),
        }
    }
}

impl Default for RideSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Fatal conditions surfaced through the observation interface.
///
/// These are state, not errors: the presentation layer renders them and
/// decides what to do with the preserved session data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideFault {
    /// The platform revoked location access mid-session
    PermissionRequired,
    /// A persistence write failed or disk space ran out
    StorageUnavailable,
}

/// A continuously-published view of the recorder for observers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveSnapshot {
    /// Current state
    pub state: RecordingState,
    /// Current session aggregates, if a session is live or stopped-unsaved
    pub session: Option<RideSession>,
    /// Most recent gated speed in m/s; zero when idle, paused, or stationary
    pub current_speed_ms: f64,
    /// The last fix was rejected for poor accuracy
    pub gps_degraded: bool,
    /// Fatal condition, if any
    pub fault: Option<RideFault>,
}

/// Auto-pause behavior, user-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPauseSettings {
    /// Whether stationary detection may pause the session
    pub enabled: bool,
    /// Sustained stationary minutes before pausing (1-15)
    pub threshold_minutes: u8,
}

impl AutoPauseSettings {
    /// Stationary window that triggers an auto-pause, clamped to 1-15 min.
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(60 * u64::from(self.threshold_minutes.clamp(1, 15)))
    }
}

impl Default for AutoPauseSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_minutes: 2,
        }
    }
}

/// Configuration for the ride recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Fixes with worse accuracy than this are rejected outright
    pub max_accuracy_m: f64,
    /// Speeds below this report as zero and count as stationary
    pub stationary_cutoff_ms: f64,
    /// Delay between the first usable fix and the start of counting
    pub stabilization_delay: Duration,
    /// Moving duration below which observers still see a zeroed clock
    pub min_moving_duration: Duration,
    /// How often the aggregate row is rewritten during recording
    pub aggregate_write_interval: Duration,
    /// Fixes buffered before a batched insert
    pub fix_batch_size: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: 50.0,
            stationary_cutoff_ms: STATIONARY_CUTOFF_MS,
            stabilization_delay: Duration::from_millis(1500),
            min_moving_duration: Duration::from_millis(200),
            aggregate_write_interval: Duration::from_secs(5),
            fix_batch_size: 16,
        }
    }
}

/// Errors from the ride recorder.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Nothing recorded worth saving
    #[error("No data recorded")]
    NoData,

    /// Save is only valid from the stopped state
    #[error("Not stopped: {0:?}")]
    NotStopped(RecordingState),

    /// Failed to persist ride data
    #[error("Failed to save ride: {0}")]
    SaveFailed(String),

    /// Failed to load recovery data
    #[error("Failed to recover ride: {0}")]
    RecoveryFailed(String),

    /// Storage is full or critically low
    #[error("Storage is full - cannot continue recording")]
    StorageFull,
}

/// Errors during ride export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No fixes to export
    #[error("Ride has no data to export")]
    NoData,

    /// The session was never finalized with a start time
    #[error("Ride has no start time")]
    NoStartTime,

    /// XML generation error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Failed to write export data
    #[error("Failed to write data: {0}")]
    WriteFailed(String),
}
