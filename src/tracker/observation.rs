//! Per-frame input to the registry.

use crate::geometry::{Anchor, BoundingRegion, Point};

/// Stable identity handed out by the upstream multi-object tracker.
pub type TrackId = u64;

/// One identity seen in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Identity assigned by the upstream tracker
    pub track_id: TrackId,
    /// Bounding region in center format
    pub region: BoundingRegion,
    /// Point used for displacement measurement
    pub reference_point: Point,
}

impl Observation {
    /// Create an observation whose reference point is the region centroid.
    pub fn new(track_id: TrackId, region: BoundingRegion) -> Self {
        Self::anchored(track_id, region, Anchor::Centroid)
    }

    /// Create an observation whose reference point is derived with `anchor`.
    pub fn anchored(track_id: TrackId, region: BoundingRegion, anchor: Anchor) -> Self {
        Self {
            track_id,
            region,
            reference_point: region.anchor_point(anchor),
        }
    }

    pub fn with_reference_point(track_id: TrackId, region: BoundingRegion, point: Point) -> Self {
        Self {
            track_id,
            region,
            reference_point: point,
        }
    }

    /// Malformed observations are skipped by the registry for the frame they appear in.
    pub fn is_valid(&self) -> bool {
        self.region.is_valid()
            && self.reference_point.x.is_finite()
            && self.reference_point.y.is_finite()
    }
}
