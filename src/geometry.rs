mod polygon;
mod region;

pub use polygon::{Containment, Zone, point_in_polygon};
pub use region::{Anchor, BoundingRegion, Point, euclidean_distance, snap_to_pixel};
