//! Location sources delivering position fixes as an async event stream.

use crate::location::types::{AccuracyTier, LocationEvent, LocationUpdate};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::time::Duration;

/// A provider of location events.
///
/// Implementations wrap a platform receiver, a replay file, or a script.
/// The recording service consumes the stream from a single task; pausing
/// consumption is the caller's concern (the stream is simply not polled).
pub trait LocationSource: Send {
    /// Take the event stream. Called once by the consumer.
    fn events(&mut self) -> BoxStream<'static, LocationEvent>;
}

/// A scripted location source that plays back a fixed list of events at a
/// configurable interval. Used by the demo binary and tests.
pub struct SimulatedLocationSource {
    events: Vec<LocationEvent>,
    interval: Duration,
}

impl SimulatedLocationSource {
    /// Create a source that emits the given events, one per interval.
    pub fn new(events: Vec<LocationEvent>, interval: Duration) -> Self {
        Self { events, interval }
    }

    /// Create a source emitting at the fix interval of an accuracy tier.
    pub fn with_tier(events: Vec<LocationEvent>, tier: AccuracyTier) -> Self {
        Self::new(events, tier.fix_interval())
    }

    /// Script a straight ride north from a starting point.
    ///
    /// Produces `count` fixes stepping `step_deg` degrees of latitude each,
    /// at the given speed and accuracy.
    pub fn straight_line(
        start_lat: f64,
        start_lon: f64,
        step_deg: f64,
        count: usize,
        speed_ms: f64,
        accuracy_m: f64,
        interval: Duration,
    ) -> Self {
        let events = (0..count)
            .map(|i| {
                LocationEvent::Fix(LocationUpdate::new(
                    start_lat + step_deg * i as f64,
                    start_lon,
                    speed_ms,
                    accuracy_m,
                ))
            })
            .collect();
        Self::new(events, interval)
    }
}

impl LocationSource for SimulatedLocationSource {
    fn events(&mut self) -> BoxStream<'static, LocationEvent> {
        let interval = self.interval;
        let events = std::mem::take(&mut self.events);

        futures::stream::iter(events)
            .then(move |event| async move {
                tokio::time::sleep(interval).await;
                event
            })
            .boxed()
    }
}

/// A source backed by a plain channel, for feeding events from another task.
pub struct ChannelLocationSource {
    rx: Option<tokio::sync::mpsc::UnboundedReceiver<LocationEvent>>,
}

impl ChannelLocationSource {
    /// Create a channel-backed source and the sender half that feeds it.
    pub fn new() -> (tokio::sync::mpsc::UnboundedSender<LocationEvent>, Self) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (tx, Self { rx: Some(rx) })
    }
}

impl LocationSource for ChannelLocationSource {
    fn events(&mut self) -> BoxStream<'static, LocationEvent> {
        let Some(rx) = self.rx.take() else {
            return futures::stream::empty().boxed();
        };
        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed()
    }
}
