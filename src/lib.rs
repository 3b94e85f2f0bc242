//! RideTrack - GPS Ride Recording Engine
//!
//! A headless ride-recording engine for cycling applications. Consumes a
//! stream of GPS position fixes, tracks manual and automatic pause
//! accounting with live duration/distance/speed statistics, persists
//! sessions to SQLite with crash recovery, and broadcasts snapshots to any
//! number of observers.

pub mod geo;
pub mod location;
pub mod recording;
pub mod storage;

// Re-export commonly used types
pub use location::source::{LocationSource, SimulatedLocationSource};
pub use recording::recorder::RideRecorder;
pub use recording::service::RecordingService;
pub use recording::types::{LiveSnapshot, RecordingState, RideSession};
pub use storage::config::AppConfig;
pub use storage::database::Database;
