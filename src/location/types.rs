//! Location source types: fixes, events, and accuracy tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single raw position sample from a location source.
///
/// Carries exactly what the receiver hands us; validation (accuracy
/// filtering, speed clamping) happens in the recording engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Instantaneous ground speed in m/s, as reported by the receiver
    pub speed_ms: f64,
    /// Estimated accuracy radius in meters
    pub accuracy_m: f64,
    /// Capture timestamp reported by the receiver.
    ///
    /// May trail wall-clock time by several seconds on real hardware, so it
    /// is never used as a baseline for duration math.
    pub captured_at: DateTime<Utc>,
}

impl LocationUpdate {
    /// Create an update captured now.
    pub fn new(latitude: f64, longitude: f64, speed_ms: f64, accuracy_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed_ms,
            accuracy_m,
            captured_at: Utc::now(),
        }
    }
}

/// Events emitted by a location source.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// A new position sample
    Fix(LocationUpdate),
    /// The platform revoked location access; no further fixes will arrive
    PermissionDenied,
    /// The source lost the satellite fix (tunnel, indoors); transient
    SignalLost,
}

/// Requested positioning accuracy, traded against battery.
///
/// Tiers map to the fix delivery interval requested from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    /// Full-rate positioning, one fix per second
    #[default]
    High,
    /// Reduced-rate positioning for long rides
    BatterySaver,
}

impl AccuracyTier {
    /// Fix delivery interval requested from the location source.
    pub fn fix_interval(&self) -> Duration {
        match self {
            AccuracyTier::High => Duration::from_secs(1),
            AccuracyTier::BatterySaver => Duration::from_secs(4),
        }
    }
}

impl std::fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccuracyTier::High => write!(f, "High"),
            AccuracyTier::BatterySaver => write!(f, "Battery saver"),
        }
    }
}
