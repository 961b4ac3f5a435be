use nalgebra::{Point2, distance};
use serde::{Deserialize, Serialize};

/// 2-D point in pixel coordinates.
pub type Point = Point2<f32>;

/// Axis-aligned bounding region in center format.
///
/// Supports conversion from the two other layouts trackers commonly emit:
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    /// Center x coordinate
    pub center_x: f32,
    /// Center y coordinate
    pub center_y: f32,
    /// Width of the region
    pub width: f32,
    /// Height of the region
    pub height: f32,
}

impl BoundingRegion {
    /// Create a new region from center coordinates and dimensions (XYWH format).
    #[inline]
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Create a region from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new((x1 + x2) / 2.0, (y1 + y2) / 2.0, x2 - x1, y2 - y1)
    }

    /// Create a region from TLWH format (top-left x, top-left y, width, height).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x + width / 2.0, y + height / 2.0, width, height)
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        [
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        ]
    }

    /// Convert to XYWH format: (center_x, center_y, width, height).
    #[inline]
    pub fn to_xywh(&self) -> [f32; 4] {
        [self.center_x, self.center_y, self.width, self.height]
    }

    #[inline]
    pub fn centroid(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Middle of the bottom edge, i.e. where an upright object touches the ground.
    #[inline]
    pub fn bottom_center(&self) -> Point {
        Point::new(self.center_x, self.center_y + self.height / 2.0)
    }

    /// Derive the reference point selected by `anchor`.
    #[inline]
    pub fn anchor_point(&self, anchor: Anchor) -> Point {
        match anchor {
            Anchor::Centroid => self.centroid(),
            Anchor::BottomCenter => self.bottom_center(),
        }
    }

    /// A region is usable when every coordinate is finite and both sides are positive.
    pub fn is_valid(&self) -> bool {
        self.to_xywh().iter().all(|v| v.is_finite()) && self.width > 0.0 && self.height > 0.0
    }
}

/// Which point of a [`BoundingRegion`] stands in for the whole object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Geometric center, used for stationary detection
    #[default]
    Centroid,
    /// Middle of the bottom edge, used for zone intrusion
    BottomCenter,
}

/// Straight-line distance between two points.
#[inline]
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f32 {
    distance(p1, p2)
}

/// Truncate a point onto the integer pixel grid.
#[inline]
pub fn snap_to_pixel(point: Point) -> Point {
    Point::new(point.x.trunc(), point.y.trunc())
}
