//! Closed polygons and point containment.

use ndarray::{Array2, ArrayView1};

use crate::error::{Result, WatchError};
use crate::geometry::region::Point;

/// Tolerance, in pixels, within which a point counts as lying on an edge.
const BOUNDARY_EPSILON: f64 = 1e-6;

/// Where a point lies relative to a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnBoundary,
    Outside,
}

impl Containment {
    /// Boundary contact counts as intrusion.
    #[inline]
    pub fn is_inside(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

/// Fixed region of interest: an ordered ring of at least three vertices.
///
/// Vertices are stored as an `(n, 2)` matrix of `[x, y]` rows. The ring is closed
/// implicitly; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    vertices: Array2<f32>,
}

impl Zone {
    /// Build a zone from an ordered point sequence.
    pub fn new(points: &[Point]) -> Result<Self> {
        let mut vertices = Array2::zeros((points.len(), 2));
        for (i, p) in points.iter().enumerate() {
            vertices[[i, 0]] = p.x;
            vertices[[i, 1]] = p.y;
        }
        Self::from_array(vertices)
    }

    /// Build a zone from an `(n, 2)` vertex matrix.
    pub fn from_array(vertices: Array2<f32>) -> Result<Self> {
        let (rows, cols) = vertices.dim();
        if cols != 2 {
            return Err(WatchError::InvalidZone(format!(
                "expected vertices of shape (n, 2), got ({rows}, {cols})"
            )));
        }
        if rows < 3 {
            return Err(WatchError::InvalidZone(format!(
                "a polygon needs at least 3 points, got {rows}"
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(WatchError::InvalidZone(
                "vertex coordinates must be finite".to_string(),
            ));
        }

        let zone = Self { vertices };
        if zone.area() <= BOUNDARY_EPSILON {
            return Err(WatchError::InvalidZone(
                "polygon vertices are collinear or coincident".to_string(),
            ));
        }
        Ok(zone)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.nrows()
    }

    /// Always `false` for a zone that passed construction.
    pub fn is_empty(&self) -> bool {
        self.vertices.nrows() == 0
    }

    /// Vertex at `index`, or `None` when out of range.
    pub fn vertex(&self, index: usize) -> Option<Point> {
        (index < self.len()).then(|| self.vertex_at(index))
    }

    fn vertex_at(&self, index: usize) -> Point {
        row_to_point(self.vertices.row(index))
    }

    /// Iterate vertices in ring order.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.vertices.rows().into_iter().map(row_to_point)
    }

    /// Get a reference to the underlying `(n, 2)` vertex matrix.
    pub fn as_array(&self) -> &Array2<f32> {
        &self.vertices
    }

    /// Unsigned area from the shoelace formula.
    pub fn area(&self) -> f64 {
        let n = self.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.vertex_at(i);
                let b = self.vertex_at((i + 1) % n);
                a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Classify `point` against this zone.
    pub fn containment(&self, point: &Point) -> Containment {
        crossing_test(point, self.len(), |i| self.vertex_at(i))
    }
}

fn row_to_point(row: ArrayView1<'_, f32>) -> Point {
    Point::new(row[0], row[1])
}

/// Classify `point` against the closed polygon described by `polygon`.
///
/// Fails with [`WatchError::InvalidZone`] when fewer than three vertices are given.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> Result<Containment> {
    if polygon.len() < 3 {
        return Err(WatchError::InvalidZone(format!(
            "a polygon needs at least 3 points, got {}",
            polygon.len()
        )));
    }
    Ok(crossing_test(point, polygon.len(), |i| polygon[i]))
}

/// Crossing-number test with an explicit edge check run first, so boundary points
/// never depend on which side the ray parity happens to land.
fn crossing_test(point: &Point, n: usize, vertex: impl Fn(usize) -> Point) -> Containment {
    let (px, py) = (point.x as f64, point.y as f64);
    let mut inside = false;

    for i in 0..n {
        let a = vertex(i);
        let b = vertex((i + 1) % n);
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (bx, by) = (b.x as f64, b.y as f64);

        if on_segment(px, py, ax, ay, bx, by) {
            return Containment::OnBoundary;
        }

        if (ay > py) != (by > py) {
            let x_cross = ax + (py - ay) * (bx - ax) / (by - ay);
            if px < x_cross {
                inside = !inside;
            }
        }
    }

    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

fn on_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (px - ax).hypot(py - ay) <= BOUNDARY_EPSILON;
    }

    let len = len_sq.sqrt();
    let cross = dx * (py - ay) - dy * (px - ax);
    if cross.abs() / len > BOUNDARY_EPSILON {
        return false;
    }

    let dot = (px - ax) * dx + (py - ay) * dy;
    dot >= -BOUNDARY_EPSILON * len && dot <= len_sq + BOUNDARY_EPSILON * len
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_inside_and_outside() {
        let poly = square();
        assert_eq!(
            point_in_polygon(&Point::new(5.0, 5.0), &poly).unwrap(),
            Containment::Inside
        );
        assert_eq!(
            point_in_polygon(&Point::new(15.0, 5.0), &poly).unwrap(),
            Containment::Outside
        );
        assert_eq!(
            point_in_polygon(&Point::new(-0.5, 5.0), &poly).unwrap(),
            Containment::Outside
        );
    }

    #[test]
    fn test_boundary_points() {
        let poly = square();
        for p in [
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        ] {
            assert_eq!(
                point_in_polygon(&p, &poly).unwrap(),
                Containment::OnBoundary,
                "{p:?} should lie on the boundary"
            );
        }
    }

    #[test]
    fn test_boundary_is_deterministic() {
        let zone = Zone::new(&square()).unwrap();
        let p = Point::new(10.0, 3.0);
        let first = zone.containment(&p);
        for _ in 0..100 {
            assert_eq!(zone.containment(&p), first);
        }
        assert!(first.is_inside());
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upwards
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert_eq!(
            point_in_polygon(&Point::new(15.0, 20.0), &poly).unwrap(),
            Containment::Outside
        );
        assert_eq!(
            point_in_polygon(&Point::new(5.0, 20.0), &poly).unwrap(),
            Containment::Inside
        );
        assert_eq!(
            point_in_polygon(&Point::new(25.0, 5.0), &poly).unwrap(),
            Containment::Inside
        );
    }

    #[test]
    fn test_too_few_points() {
        let poly = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(matches!(
            point_in_polygon(&Point::new(0.0, 0.0), &poly),
            Err(WatchError::InvalidZone(_))
        ));
        assert!(matches!(Zone::new(&poly), Err(WatchError::InvalidZone(_))));
    }

    #[test]
    fn test_degenerate_zone_rejected() {
        let collinear = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        assert!(matches!(
            Zone::new(&collinear),
            Err(WatchError::InvalidZone(_))
        ));
    }

    #[test]
    fn test_zone_from_array() {
        let zone = Zone::from_array(array![[0.0, 0.0], [4.0, 0.0], [0.0, 3.0]]).unwrap();
        assert_eq!(zone.len(), 3);
        assert!((zone.area() - 6.0).abs() < 1e-9);
        assert_eq!(zone.vertex(1), Some(Point::new(4.0, 0.0)));
        assert_eq!(zone.vertex(3), None);
        assert_eq!(zone.vertices().last(), Some(Point::new(0.0, 3.0)));

        let wrong_shape = Zone::from_array(array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert!(matches!(wrong_shape, Err(WatchError::InvalidZone(_))));
    }
}
