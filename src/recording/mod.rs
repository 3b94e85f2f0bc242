//! Recording module for ride session capture and export.

pub mod exporter_csv;
pub mod exporter_gpx;
pub mod recorder;
pub mod recovery;
pub mod service;
pub mod types;

pub use recorder::RideRecorder;
pub use recovery::IncompleteRide;
pub use service::{RecordingService, RideCommand};
pub use types::{
    AutoPauseSettings, ExportError, LiveSnapshot, PauseKind, PositionFix, RecorderConfig,
    RecorderError, RecordingState, RideFault, RideSession,
};
