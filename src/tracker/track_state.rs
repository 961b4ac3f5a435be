use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingRegion, Point, euclidean_distance};
use crate::tracker::observation::Observation;

/// Alerting phase of a tracked identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackPhase {
    /// Tracked, no stationary alert raised for the current episode
    #[default]
    Unalerted,
    /// Tracked, stationary alert already raised for the current episode
    Alerted,
}

/// Which stored point a new observation is compared against when measuring motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementReference {
    /// Previous frame's reference point. Slow steady motion below the threshold per
    /// frame never restarts the episode.
    #[default]
    PreviousFrame,
    /// Reference point recorded when the current episode began.
    EpisodeOrigin,
}

/// Stored state for one identity.
#[derive(Debug, Clone)]
pub struct TrackState {
    /// Most recent bounding region
    pub last_region: BoundingRegion,
    /// Most recent reference point
    pub last_reference_point: Point,
    /// Reference point at the start of the current episode
    pub origin_point: Point,
    /// Frame at which the current stationary episode began
    pub motion_origin_frame: u64,
    /// Consecutive frames since the identity was last observed
    pub missed_frame_count: u32,
    /// Whether a stationary alert fired for the current episode
    pub alerted: bool,
}

impl TrackState {
    pub fn new(observation: &Observation, frame_index: u64) -> Self {
        Self {
            last_region: observation.region,
            last_reference_point: observation.reference_point,
            origin_point: observation.reference_point,
            motion_origin_frame: frame_index,
            missed_frame_count: 0,
            alerted: false,
        }
    }

    /// Alerting phase derived from the `alerted` flag.
    pub fn phase(&self) -> TrackPhase {
        if self.alerted {
            TrackPhase::Alerted
        } else {
            TrackPhase::Unalerted
        }
    }

    /// Fold a fresh observation into the state.
    ///
    /// Returns `true` when displacement exceeded `threshold` and a new episode began.
    pub fn observe(
        &mut self,
        observation: &Observation,
        frame_index: u64,
        threshold: f32,
        reference: DisplacementReference,
    ) -> bool {
        let compared_to = match reference {
            DisplacementReference::PreviousFrame => self.last_reference_point,
            DisplacementReference::EpisodeOrigin => self.origin_point,
        };
        let moved = euclidean_distance(&observation.reference_point, &compared_to) > threshold;

        if moved {
            self.motion_origin_frame = frame_index;
            self.origin_point = observation.reference_point;
            self.alerted = false;
        }

        self.last_region = observation.region;
        self.last_reference_point = observation.reference_point;
        self.missed_frame_count = 0;
        moved
    }

    pub fn mark_missed(&mut self) {
        self.missed_frame_count = self.missed_frame_count.saturating_add(1);
    }

    pub fn stationary_frames(&self, frame_index: u64) -> u64 {
        frame_index.saturating_sub(self.motion_origin_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs_at(x: f32, y: f32) -> Observation {
        Observation::new(1, BoundingRegion::new(x, y, 10.0, 10.0))
    }

    #[test]
    fn test_small_motion_keeps_episode() {
        let mut state = TrackState::new(&obs_at(100.0, 100.0), 1);
        state.alerted = true;

        let moved = state.observe(
            &obs_at(101.0, 100.0),
            2,
            2.0,
            DisplacementReference::PreviousFrame,
        );
        assert!(!moved);
        assert_eq!(state.motion_origin_frame, 1);
        assert_eq!(state.phase(), TrackPhase::Alerted);
        assert_eq!(state.last_reference_point, Point::new(101.0, 100.0));
    }

    #[test]
    fn test_large_motion_restarts_episode() {
        let mut state = TrackState::new(&obs_at(100.0, 100.0), 1);
        state.alerted = true;
        state.missed_frame_count = 3;

        let moved = state.observe(
            &obs_at(110.0, 100.0),
            5,
            2.0,
            DisplacementReference::PreviousFrame,
        );
        assert!(moved);
        assert_eq!(state.motion_origin_frame, 5);
        assert_eq!(state.missed_frame_count, 0);
        assert_eq!(state.phase(), TrackPhase::Unalerted);
        assert_eq!(state.origin_point, Point::new(110.0, 100.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut state = TrackState::new(&obs_at(100.0, 100.0), 1);
        let moved = state.observe(
            &obs_at(102.0, 100.0),
            2,
            2.0,
            DisplacementReference::PreviousFrame,
        );
        assert!(!moved);
    }

    #[test]
    fn test_episode_origin_catches_drift() {
        let mut previous = TrackState::new(&obs_at(100.0, 100.0), 1);
        let mut origin = previous.clone();

        let mut previous_resets = 0;
        let mut origin_resets = 0;
        for step in 1..=5u64 {
            let obs = obs_at(100.0 + step as f32, 100.0);
            if previous.observe(&obs, step + 1, 2.0, DisplacementReference::PreviousFrame) {
                previous_resets += 1;
            }
            if origin.observe(&obs, step + 1, 2.0, DisplacementReference::EpisodeOrigin) {
                origin_resets += 1;
            }
        }

        assert_eq!(previous_resets, 0);
        assert_eq!(previous.stationary_frames(6), 5);
        // Resets at +3px (frame 4); the next +3px is only reached by frame 7.
        assert_eq!(origin_resets, 1);
        assert_eq!(origin.motion_origin_frame, 4);
    }
}
