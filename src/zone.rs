//! Per-frame inside/outside decision against a fixed zone.

use crate::geometry::{Anchor, BoundingRegion, Point, Zone, snap_to_pixel};

/// Two-way zone classification; boundary contact is folded into `Inside`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneMembership {
    Inside,
    Outside,
}

impl ZoneMembership {
    #[inline]
    pub fn is_inside(self) -> bool {
        self == ZoneMembership::Inside
    }
}

/// Stateless classifier; transition tracking lives in the alert dispatcher.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    zone: Zone,
    anchor: Anchor,
    snap_to_pixel: bool,
}

impl ZoneClassifier {
    /// Classifier using the bottom-center of each region, where an upright object
    /// meets the ground plane.
    pub fn new(zone: Zone) -> Self {
        Self::with_anchor(zone, Anchor::BottomCenter)
    }

    pub fn with_anchor(zone: Zone, anchor: Anchor) -> Self {
        Self {
            zone,
            anchor,
            snap_to_pixel: false,
        }
    }

    /// Truncate anchor points to whole pixels before testing them.
    pub fn with_snap_to_pixel(mut self, snap: bool) -> Self {
        self.snap_to_pixel = snap;
        self
    }

    /// Get a reference to the underlying zone.
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Get the point of a region this classifier tests.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Whether anchor points are truncated onto the pixel grid.
    pub fn snaps_to_pixel(&self) -> bool {
        self.snap_to_pixel
    }

    /// Point of `region` the zone decision is made on.
    pub fn anchor_point(&self, region: &BoundingRegion) -> Point {
        let point = region.anchor_point(self.anchor);
        if self.snap_to_pixel {
            snap_to_pixel(point)
        } else {
            point
        }
    }

    pub fn classify(&self, point: &Point) -> ZoneMembership {
        if self.zone.containment(point).is_inside() {
            ZoneMembership::Inside
        } else {
            ZoneMembership::Outside
        }
    }

    /// Classify a region through this classifier's anchor.
    pub fn classify_region(&self, region: &BoundingRegion) -> ZoneMembership {
        self.classify(&self.anchor_point(region))
    }
}
