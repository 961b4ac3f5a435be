//! Per-identity state store driving the stationary-duration state machine.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, WatchError};
use crate::geometry::{BoundingRegion, Point};
use crate::tracker::observation::{Observation, TrackId};
use crate::tracker::track_state::{DisplacementReference, TrackPhase, TrackState};

/// Frame rate substituted when the video source reports none.
pub const DEFAULT_FPS_FALLBACK: f64 = 30.0;

/// Source-reported frame rate plus the value to use when the report is unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate {
    pub reported: f64,
    pub fallback: Option<f64>,
}

impl FrameRate {
    /// Reported rate with no fallback; a non-positive report is a configuration error.
    pub fn new(reported: f64) -> Self {
        Self {
            reported,
            fallback: None,
        }
    }

    pub fn with_fallback(reported: f64, fallback: f64) -> Self {
        Self {
            reported,
            fallback: Some(fallback),
        }
    }

    /// Reported rate, falling back to [`DEFAULT_FPS_FALLBACK`].
    pub fn with_default_fallback(reported: f64) -> Self {
        Self::with_fallback(reported, DEFAULT_FPS_FALLBACK)
    }

    /// Rate used in all duration math.
    pub fn effective(&self) -> Result<f64> {
        if self.reported.is_finite() && self.reported > 0.0 {
            return Ok(self.reported);
        }
        match self.fallback {
            Some(fallback) if fallback.is_finite() && fallback > 0.0 => Ok(fallback),
            Some(fallback) => Err(WatchError::InvalidConfiguration(format!(
                "fps fallback must be positive, got {fallback}"
            ))),
            None => Err(WatchError::InvalidConfiguration(format!(
                "reported fps {} is not positive and no fallback is configured",
                self.reported
            ))),
        }
    }
}

/// Configuration for the [`TrackRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Displacement in pixels above which an object counts as moving
    pub stationary_threshold_distance: f32,
    /// Consecutive unseen frames tolerated before an identity is evicted
    pub frames_to_disappear: u32,
    pub frame_rate: FrameRate,
    pub displacement_reference: DisplacementReference,
}

impl RegistryConfig {
    pub fn new(
        stationary_threshold_distance: f32,
        frames_to_disappear: u32,
        frame_rate: FrameRate,
    ) -> Self {
        Self {
            stationary_threshold_distance,
            frames_to_disappear,
            frame_rate,
            displacement_reference: DisplacementReference::default(),
        }
    }

    pub fn with_displacement_reference(mut self, reference: DisplacementReference) -> Self {
        self.displacement_reference = reference;
        self
    }

    fn validate(&self) -> Result<f64> {
        let distance = self.stationary_threshold_distance;
        if !distance.is_finite() || distance <= 0.0 {
            return Err(WatchError::InvalidConfiguration(format!(
                "stationary threshold distance must be positive, got {distance}"
            )));
        }
        self.frame_rate.effective()
    }
}

/// Snapshot of one observed identity after a registry update.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStatus {
    pub track_id: TrackId,
    pub region: BoundingRegion,
    pub reference_point: Point,
    /// Frames elapsed since the current episode began
    pub stationary_frames: u64,
    /// `stationary_frames` converted with the effective frame rate
    pub stationary_seconds: f64,
    pub phase: TrackPhase,
}

/// Outcome of [`TrackRegistry::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryUpdate {
    /// Every identity observed this frame, in observation order
    pub active: Vec<TrackStatus>,
    /// Identities discarded this frame after exceeding the disappearance tolerance
    pub evicted: Vec<TrackId>,
    /// Identities whose observation was malformed and ignored this frame
    pub skipped: Vec<TrackId>,
}

/// Owns every [`TrackState`]; all mutation goes through [`TrackRegistry::update`].
#[derive(Debug)]
pub struct TrackRegistry {
    tracks: HashMap<TrackId, TrackState>,
    config: RegistryConfig,
    fps: f64,
    last_frame: Option<u64>,
}

impl TrackRegistry {
    /// Create a registry, failing fast on unusable configuration.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let fps = config.validate()?;
        Ok(Self {
            tracks: HashMap::new(),
            config,
            fps,
            last_frame: None,
        })
    }

    /// Get a reference to the configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Frame rate used in duration math, after fallback resolution.
    pub fn frames_per_second(&self) -> f64 {
        self.fps
    }

    /// Index of the last accepted frame, if any.
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Number of identities currently held, including ones not seen this frame.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns `true` if no identity is being tracked.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Get a reference to the stored state of `track_id`.
    pub fn get(&self, track_id: TrackId) -> Option<&TrackState> {
        self.tracks.get(&track_id)
    }

    /// Returns `true` if `track_id` is held by the registry.
    pub fn contains(&self, track_id: TrackId) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Identities currently held, in no particular order.
    pub fn track_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.keys().copied()
    }

    /// Record that the stationary alert for `track_id`'s current episode has fired.
    pub fn mark_alerted(&mut self, track_id: TrackId) -> Result<()> {
        let state = self
            .tracks
            .get_mut(&track_id)
            .ok_or(WatchError::UnknownTrack(track_id))?;
        state.alerted = true;
        Ok(())
    }

    /// Identities whose missed-frame count exceeds the disappearance tolerance.
    pub fn eviction_candidates(&self) -> Vec<TrackId> {
        let mut ids: Vec<TrackId> = self
            .tracks
            .iter()
            .filter(|(_, state)| state.missed_frame_count > self.config.frames_to_disappear)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Fold one frame's observations into the registry.
    ///
    /// The call is rejected without touching any state when `frame_index` does not
    /// advance past the previous frame or an identity appears twice.
    pub fn update(
        &mut self,
        frame_index: u64,
        observations: &[Observation],
    ) -> Result<RegistryUpdate> {
        if let Some(last) = self.last_frame {
            if frame_index <= last {
                return Err(WatchError::FrameOutOfOrder {
                    last,
                    got: frame_index,
                });
            }
        }

        let mut present = HashSet::with_capacity(observations.len());
        for obs in observations {
            if !present.insert(obs.track_id) {
                return Err(WatchError::DuplicateObservation(obs.track_id));
            }
        }

        self.last_frame = Some(frame_index);

        // Step 1: Create or refresh observed identities
        let mut skipped = Vec::new();
        for obs in observations {
            if !obs.is_valid() {
                debug!(track_id = obs.track_id, frame_index, "skipping malformed observation");
                skipped.push(obs.track_id);
                continue;
            }

            match self.tracks.get_mut(&obs.track_id) {
                Some(state) => {
                    let restarted = state.observe(
                        obs,
                        frame_index,
                        self.config.stationary_threshold_distance,
                        self.config.displacement_reference,
                    );
                    if restarted {
                        debug!(track_id = obs.track_id, frame_index, "motion restarted episode");
                    }
                }
                None => {
                    debug!(track_id = obs.track_id, frame_index, "new track");
                    self.tracks
                        .insert(obs.track_id, TrackState::new(obs, frame_index));
                }
            }
        }

        // Step 2: Age identities absent from this frame
        for (id, state) in self.tracks.iter_mut() {
            if !present.contains(id) {
                state.mark_missed();
            }
        }

        // Step 3: Evict in a separate pass
        let evicted = self.eviction_candidates();
        for id in &evicted {
            self.tracks.remove(id);
            debug!(track_id = *id, frame_index, "evicted track");
        }

        let active = observations
            .iter()
            .filter(|obs| !skipped.contains(&obs.track_id))
            .filter_map(|obs| {
                self.tracks
                    .get(&obs.track_id)
                    .map(|state| self.status(obs.track_id, state, frame_index))
            })
            .collect();

        Ok(RegistryUpdate {
            active,
            evicted,
            skipped,
        })
    }

    fn status(&self, track_id: TrackId, state: &TrackState, frame_index: u64) -> TrackStatus {
        let stationary_frames = state.stationary_frames(frame_index);
        TrackStatus {
            track_id,
            region: state.last_region,
            reference_point: state.last_reference_point,
            stationary_frames,
            stationary_seconds: stationary_frames as f64 / self.fps,
            phase: state.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn registry(frames_to_disappear: u32) -> TrackRegistry {
        TrackRegistry::new(RegistryConfig::new(
            2.0,
            frames_to_disappear,
            FrameRate::new(30.0),
        ))
        .unwrap()
    }

    fn obs(id: TrackId, x: f32, y: f32) -> Observation {
        Observation::new(id, BoundingRegion::new(x, y, 20.0, 40.0))
    }

    #[test]
    fn test_new_track_starts_episode() {
        let mut reg = registry(5);
        let update = reg.update(1, &[obs(7, 50.0, 50.0)]).unwrap();

        assert_eq!(update.active.len(), 1);
        assert_eq!(update.active[0].stationary_frames, 0);
        assert_eq!(update.active[0].phase, TrackPhase::Unalerted);

        let state = reg.get(7).unwrap();
        assert_eq!(state.motion_origin_frame, 1);
        assert_eq!(state.missed_frame_count, 0);
    }

    #[test]
    fn test_duration_uses_fps() {
        let mut reg = registry(5);
        for frame in 1..=46 {
            reg.update(frame, &[obs(1, 50.0, 50.0)]).unwrap();
        }
        let update = reg.update(47, &[obs(1, 50.0, 50.0)]).unwrap();
        assert_relative_eq!(update.active[0].stationary_seconds, 46.0 / 30.0);
    }

    #[test]
    fn test_duplicate_observation_rejected_without_mutation() {
        let mut reg = registry(5);
        reg.update(1, &[obs(1, 10.0, 10.0)]).unwrap();

        let err = reg
            .update(2, &[obs(2, 0.0, 0.0), obs(1, 90.0, 90.0), obs(1, 10.0, 10.0)])
            .unwrap_err();
        assert!(matches!(err, WatchError::DuplicateObservation(1)));
        assert!(!reg.contains(2));
        assert_eq!(reg.get(1).unwrap().last_reference_point, Point::new(10.0, 10.0));
        assert_eq!(reg.last_frame(), Some(1));

        // the same frame index may be retried after a rejection
        assert!(reg.update(2, &[obs(1, 10.0, 10.0)]).is_ok());
    }

    #[test]
    fn test_out_of_order_frame_rejected() {
        let mut reg = registry(5);
        reg.update(3, &[obs(1, 10.0, 10.0)]).unwrap();
        assert!(matches!(
            reg.update(3, &[]),
            Err(WatchError::FrameOutOfOrder { last: 3, got: 3 })
        ));
        assert!(matches!(
            reg.update(2, &[]),
            Err(WatchError::FrameOutOfOrder { last: 3, got: 2 })
        ));
    }

    #[test]
    fn test_missed_frames_then_eviction() {
        let mut reg = registry(2);
        reg.update(1, &[obs(1, 10.0, 10.0)]).unwrap();

        for frame in 2..=3 {
            let update = reg.update(frame, &[]).unwrap();
            assert!(update.evicted.is_empty());
        }
        assert_eq!(reg.get(1).unwrap().missed_frame_count, 2);

        let update = reg.update(4, &[]).unwrap();
        assert_eq!(update.evicted, vec![1]);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_reappearance_resets_missed_count() {
        let mut reg = registry(2);
        reg.update(1, &[obs(1, 10.0, 10.0)]).unwrap();
        reg.update(2, &[]).unwrap();
        reg.update(3, &[]).unwrap();
        let update = reg.update(4, &[obs(1, 10.0, 10.0)]).unwrap();

        assert!(update.evicted.is_empty());
        assert_eq!(reg.get(1).unwrap().missed_frame_count, 0);
        // episode continues across the gap
        assert_eq!(update.active[0].stationary_frames, 3);
    }

    #[test]
    fn test_zero_tolerance_evicts_on_first_miss() {
        let mut reg = registry(0);
        reg.update(1, &[obs(1, 10.0, 10.0)]).unwrap();
        let update = reg.update(2, &[]).unwrap();
        assert_eq!(update.evicted, vec![1]);
    }

    #[test]
    fn test_malformed_observation_is_isolated() {
        let mut reg = registry(5);
        reg.update(1, &[obs(1, 10.0, 10.0), obs(2, 50.0, 50.0)]).unwrap();

        let broken = Observation::new(1, BoundingRegion::new(10.0, 10.0, -4.0, 8.0));
        let update = reg.update(2, &[broken, obs(2, 50.0, 50.0)]).unwrap();

        assert_eq!(update.skipped, vec![1]);
        assert_eq!(update.active.len(), 1);
        assert_eq!(update.active[0].track_id, 2);

        let state = reg.get(1).unwrap();
        assert_eq!(state.missed_frame_count, 0);
        assert_eq!(state.last_region, BoundingRegion::new(10.0, 10.0, 20.0, 40.0));
    }

    #[test]
    fn test_malformed_first_sighting_not_registered() {
        let mut reg = registry(5);
        let broken = Observation::new(9, BoundingRegion::new(f32::NAN, 0.0, 4.0, 4.0));
        let update = reg.update(1, &[broken]).unwrap();
        assert_eq!(update.skipped, vec![9]);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_mark_alerted() {
        let mut reg = registry(5);
        reg.update(1, &[obs(1, 10.0, 10.0)]).unwrap();
        reg.mark_alerted(1).unwrap();
        assert!(reg.get(1).unwrap().alerted);
        assert!(matches!(reg.mark_alerted(2), Err(WatchError::UnknownTrack(2))));

        let update = reg.update(2, &[obs(1, 10.0, 10.0)]).unwrap();
        assert_eq!(update.active[0].phase, TrackPhase::Alerted);

        // moving away starts a fresh, unalerted episode
        let update = reg.update(3, &[obs(1, 40.0, 10.0)]).unwrap();
        assert_eq!(update.active[0].phase, TrackPhase::Unalerted);
    }

    #[test]
    fn test_eviction_candidates_is_pure() {
        let mut reg = registry(1);
        reg.update(1, &[obs(1, 10.0, 10.0), obs(2, 20.0, 20.0)]).unwrap();
        reg.update(2, &[obs(2, 20.0, 20.0)]).unwrap();
        assert!(reg.eviction_candidates().is_empty());
        assert_eq!(reg.eviction_candidates(), reg.eviction_candidates());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_invalid_configuration() {
        let bad_distance = RegistryConfig::new(0.0, 5, FrameRate::new(30.0));
        assert!(matches!(
            TrackRegistry::new(bad_distance),
            Err(WatchError::InvalidConfiguration(_))
        ));

        let no_fps = RegistryConfig::new(2.0, 5, FrameRate::new(0.0));
        assert!(matches!(
            TrackRegistry::new(no_fps),
            Err(WatchError::InvalidConfiguration(_))
        ));

        let bad_fallback = RegistryConfig::new(2.0, 5, FrameRate::with_fallback(0.0, -1.0));
        assert!(matches!(
            TrackRegistry::new(bad_fallback),
            Err(WatchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_fps_fallback() {
        let reg = TrackRegistry::new(RegistryConfig::new(
            2.0,
            5,
            FrameRate::with_default_fallback(0.0),
        ))
        .unwrap();
        assert_relative_eq!(reg.frames_per_second(), 30.0);

        let reported = FrameRate::with_default_fallback(25.0);
        assert_relative_eq!(reported.effective().unwrap(), 25.0);
    }
}
