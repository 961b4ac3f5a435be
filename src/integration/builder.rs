//! Builder for creating Observation objects from various box formats.

use crate::geometry::{Anchor, BoundingRegion, snap_to_pixel};
use crate::tracker::{Observation, TrackId};

/// Builder for creating [`Observation`]s from various box formats.
#[derive(Debug, Clone, Default)]
pub struct ObservationBuilder {
    track_id: TrackId,
    region: BoundingRegion,
    anchor: Anchor,
    snap_to_pixel: bool,
}

impl ObservationBuilder {
    /// Create a new observation builder.
    pub fn new(track_id: TrackId) -> Self {
        Self {
            track_id,
            ..Self::default()
        }
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.region = BoundingRegion::new(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.region = BoundingRegion::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.region = BoundingRegion::from_tlwh(x, y, w, h);
        self
    }

    /// Choose which point of the box becomes the reference point.
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Truncate the reference point to whole pixels.
    pub fn snap_to_pixel(mut self, snap: bool) -> Self {
        self.snap_to_pixel = snap;
        self
    }

    /// Build the final [`Observation`].
    pub fn build(self) -> Observation {
        let mut point = self.region.anchor_point(self.anchor);
        if self.snap_to_pixel {
            point = snap_to_pixel(point);
        }
        Observation::with_reference_point(self.track_id, self.region, point)
    }
}
