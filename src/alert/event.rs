use serde::Serialize;
use tracing::warn;

use crate::tracker::TrackId;

/// Outcome of evaluating one identity for one alert kind in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    None,
    StationaryTimeout,
    ZoneEntry,
    ZoneExit,
}

impl AlertDecision {
    pub fn kind(self) -> Option<AlertKind> {
        match self {
            AlertDecision::None => None,
            AlertDecision::StationaryTimeout => Some(AlertKind::StationaryTimeout),
            AlertDecision::ZoneEntry => Some(AlertKind::ZoneEntry),
            AlertDecision::ZoneExit => Some(AlertKind::ZoneExit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    StationaryTimeout,
    ZoneEntry,
    ZoneExit,
}

/// Discrete alert handed to an [`AlertSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub track_id: TrackId,
    pub frame_index: u64,
    /// Stationary duration at the moment of a timeout alert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stationary_seconds: Option<f64>,
}

impl AlertEvent {
    pub fn new(kind: AlertKind, track_id: TrackId, frame_index: u64) -> Self {
        Self {
            kind,
            track_id,
            frame_index,
            stationary_seconds: None,
        }
    }

    pub fn stationary_timeout(
        track_id: TrackId,
        frame_index: u64,
        stationary_seconds: f64,
    ) -> Self {
        Self {
            stationary_seconds: Some(stationary_seconds),
            ..Self::new(AlertKind::StationaryTimeout, track_id, frame_index)
        }
    }
}

/// Fire-and-forget consumer of alert events.
pub trait AlertSink {
    fn emit(&mut self, event: &AlertEvent);
}

impl AlertSink for Vec<AlertEvent> {
    fn emit(&mut self, event: &AlertEvent) {
        self.push(event.clone());
    }
}

/// Writes every alert as a `warn` level log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn emit(&mut self, event: &AlertEvent) {
        match event.kind {
            AlertKind::StationaryTimeout => warn!(
                track_id = event.track_id,
                frame = event.frame_index,
                "ALERT! Object {} stationary for {:.1}s",
                event.track_id,
                event.stationary_seconds.unwrap_or_default()
            ),
            AlertKind::ZoneEntry => warn!(
                track_id = event.track_id,
                frame = event.frame_index,
                "ALERT! Object {} entered the restricted zone",
                event.track_id
            ),
            AlertKind::ZoneExit => warn!(
                track_id = event.track_id,
                frame = event.frame_index,
                "Object {} left the restricted zone",
                event.track_id
            ),
        }
    }
}
