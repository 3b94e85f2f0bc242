//! Location module for position fix acquisition.

pub mod source;
pub mod types;

pub use source::{ChannelLocationSource, LocationSource, SimulatedLocationSource};
pub use types::{AccuracyTier, LocationEvent, LocationUpdate};
