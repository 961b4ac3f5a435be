//! Edge-triggered alert policy.

use std::collections::HashMap;

use tracing::debug;

use crate::alert::event::{AlertDecision, AlertEvent, AlertSink};
use crate::alert::render::RenderDirective;
use crate::error::{Result, WatchError};
use crate::tracker::{RegistryUpdate, TrackId, TrackPhase, TrackRegistry};
use crate::zone::{ZoneClassifier, ZoneMembership};

/// Decides when alerts fire and remembers each identity's last zone classification.
///
/// The stationary `alerted` flag is owned by the [`TrackRegistry`]; the dispatcher
/// only reads it and asks the registry to set it.
#[derive(Debug)]
pub struct AlertDispatcher {
    time_threshold_seconds: f64,
    zone_states: HashMap<TrackId, ZoneMembership>,
}

impl AlertDispatcher {
    pub fn new(time_threshold_seconds: f64) -> Result<Self> {
        if !time_threshold_seconds.is_finite() || time_threshold_seconds <= 0.0 {
            return Err(WatchError::InvalidConfiguration(format!(
                "time threshold must be positive, got {time_threshold_seconds}"
            )));
        }
        Ok(Self {
            time_threshold_seconds,
            zone_states: HashMap::new(),
        })
    }

    /// Seconds a stationary episode must exceed before it alerts.
    pub fn time_threshold_seconds(&self) -> f64 {
        self.time_threshold_seconds
    }

    /// Fires once per episode: on the first frame the duration strictly exceeds the threshold.
    pub fn evaluate(
        &self,
        track_id: TrackId,
        stationary_seconds: f64,
        already_alerted: bool,
    ) -> AlertDecision {
        if !already_alerted && stationary_seconds > self.time_threshold_seconds {
            debug!(track_id, stationary_seconds, "stationary threshold crossed");
            AlertDecision::StationaryTimeout
        } else {
            AlertDecision::None
        }
    }

    /// Transition check between two classifications.
    ///
    /// An identity with no previous classification counts as having been outside.
    pub fn evaluate_zone(
        classification: ZoneMembership,
        previous: Option<ZoneMembership>,
    ) -> AlertDecision {
        let previous = previous.unwrap_or(ZoneMembership::Outside);
        match (previous, classification) {
            (ZoneMembership::Outside, ZoneMembership::Inside) => AlertDecision::ZoneEntry,
            (ZoneMembership::Inside, ZoneMembership::Outside) => AlertDecision::ZoneExit,
            _ => AlertDecision::None,
        }
    }

    /// Record `classification` for `track_id` and report any transition.
    pub fn observe_zone(
        &mut self,
        track_id: TrackId,
        classification: ZoneMembership,
    ) -> AlertDecision {
        let previous = self.zone_states.insert(track_id, classification);
        Self::evaluate_zone(classification, previous)
    }

    /// Last zone classification recorded for `track_id`.
    pub fn zone_state(&self, track_id: TrackId) -> Option<ZoneMembership> {
        self.zone_states.get(&track_id).copied()
    }

    /// Drop the zone slot of an evicted identity.
    pub fn forget(&mut self, track_id: TrackId) {
        self.zone_states.remove(&track_id);
    }

    /// Run both alert policies over one frame's registry update.
    ///
    /// Emits events to `sink`, flags stationary alerts in `registry`, and returns
    /// render directives in observation order.
    pub fn process(
        &mut self,
        frame_index: u64,
        registry: &mut TrackRegistry,
        update: &RegistryUpdate,
        classifier: Option<&ZoneClassifier>,
        sink: &mut dyn AlertSink,
    ) -> Result<Vec<RenderDirective>> {
        for &track_id in &update.evicted {
            self.forget(track_id);
        }

        let mut directives = Vec::with_capacity(update.active.len());
        for status in &update.active {
            let mut phase = status.phase;
            let already_alerted = phase == TrackPhase::Alerted;
            let decision =
                self.evaluate(status.track_id, status.stationary_seconds, already_alerted);
            if decision == AlertDecision::StationaryTimeout {
                registry.mark_alerted(status.track_id)?;
                phase = TrackPhase::Alerted;
                sink.emit(&AlertEvent::stationary_timeout(
                    status.track_id,
                    frame_index,
                    status.stationary_seconds,
                ));
            }

            let mut membership = None;
            let mut zone_anchor = None;
            if let Some(classifier) = classifier {
                let anchor = classifier.anchor_point(&status.region);
                let classification = classifier.classify(&anchor);
                if let Some(kind) = self.observe_zone(status.track_id, classification).kind() {
                    sink.emit(&AlertEvent::new(kind, status.track_id, frame_index));
                }
                membership = Some(classification);
                zone_anchor = Some(anchor);
            }

            directives.push(RenderDirective::for_track(
                status,
                phase,
                membership,
                zone_anchor,
            ));
        }

        Ok(directives)
    }
}
