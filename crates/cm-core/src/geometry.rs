use serde::{Deserialize, Serialize};

/// One internal unit is 10^-6 of a project unit (mm or inch). All polygon
/// algebra and clipping operates at this scale; it is large enough that
/// sub-step rounding never produces degenerate edges and small enough that
/// `i64` never overflows for realistic workpieces.
pub const SCALE: f64 = 1_000_000.0;

/// A point in the fixed-point integer coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegerPoint {
    pub x: i64,
    pub y: i64,
}

impl IntegerPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Build an `IntegerPoint` from a project-unit coordinate pair.
    pub fn from_units(x: f64, y: f64) -> Self {
        Self {
            x: (x * SCALE).round() as i64,
            y: (y * SCALE).round() as i64,
        }
    }

    /// Convert back to project units.
    pub fn to_units(self) -> (f64, f64) {
        (self.x as f64 / SCALE, self.y as f64 / SCALE)
    }

    pub fn distance_to(self, other: IntegerPoint) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fill rule used to interpret a polygon soup in boolean operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

/// A non-empty, implicitly-closed sequence of vertices: the segment from the
/// last point back to the first is part of the boundary, and there is no
/// duplicate closing vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegerPath(pub Vec<IntegerPoint>);

impl IntegerPath {
    pub fn new(points: Vec<IntegerPoint>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[IntegerPoint] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate the implicitly-closed edges of this path: (last, first)
    /// included as the final edge.
    pub fn edges(&self) -> impl Iterator<Item = (IntegerPoint, IntegerPoint)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }

    /// Twice the signed area (shoelace formula). Positive means the vertices
    /// wind clockwise in a Y-down coordinate system (an "outer" contour);
    /// negative means counter-clockwise (a "hole").
    pub fn signed_area2(&self) -> i128 {
        let n = self.0.len();
        if n < 3 {
            return 0;
        }
        let mut acc: i128 = 0;
        for i in 0..n {
            let a = self.0[i];
            let b = self.0[(i + 1) % n];
            acc += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
        }
        acc
    }

    pub fn is_outer(&self) -> bool {
        self.signed_area2() > 0
    }

    pub fn reversed(&self) -> IntegerPath {
        let mut pts = self.0.clone();
        pts.reverse();
        IntegerPath(pts)
    }

    pub fn bounding_box(&self) -> Option<IntegerBounds> {
        if self.0.is_empty() {
            return None;
        }
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        for p in &self.0 {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(IntegerBounds { min_x, min_y, max_x, max_y })
    }
}

/// An axis-aligned bounding box in the integer coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerBounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl IntegerBounds {
    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    pub fn intersects(&self, other: &IntegerBounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn union(&self, other: &IntegerBounds) -> IntegerBounds {
        IntegerBounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// A polygon soup: an ordered set of paths interpreted under a fill rule.
/// Outer and inner contours are distinguished by signed area, not by any
/// explicit tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntegerPaths(pub Vec<IntegerPath>);

impl IntegerPaths {
    pub fn new(paths: Vec<IntegerPath>) -> Self {
        Self(paths)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|p| p.len() < 3)
    }

    pub fn paths(&self) -> &[IntegerPath] {
        &self.0
    }

    pub fn bounding_box(&self) -> Option<IntegerBounds> {
        self.0
            .iter()
            .filter_map(|p| p.bounding_box())
            .reduce(|a, b| a.union(&b))
    }
}

/// One computed cutter-centre tool path, ready for the G-code emitter.
/// `safe_to_close` is true when the implicit closing segment of `path` does
/// not cross the operation's clipping polygon, so the emitter may move
/// directly from the last point to the first without retracting to safe Z.
#[derive(Debug, Clone, PartialEq)]
pub struct CamPath {
    pub path: IntegerPath,
    pub safe_to_close: bool,
}

impl CamPath {
    pub fn new(path: IntegerPath, safe_to_close: bool) -> Self {
        Self { path, safe_to_close }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip_units() {
        let p = IntegerPoint::from_units(12.5, -3.25);
        let (x, y) = p.to_units();
        assert!((x - 12.5).abs() < 1e-6);
        assert!((y - (-3.25)).abs() < 1e-6);
    }

    #[test]
    fn test_square_signed_area_and_orientation() {
        // clockwise in a Y-down space: (0,0) -> (10,0) -> (10,10) -> (0,10)
        let square = IntegerPath::new(vec![
            IntegerPoint::new(0, 0),
            IntegerPoint::new(10, 0),
            IntegerPoint::new(10, 10),
            IntegerPoint::new(0, 10),
        ]);
        assert_eq!(square.signed_area2(), 200);
        assert!(square.is_outer());
        assert!(!square.reversed().is_outer());
    }

    #[test]
    fn test_bounding_box() {
        let square = IntegerPath::new(vec![
            IntegerPoint::new(1, 2),
            IntegerPoint::new(11, 2),
            IntegerPoint::new(11, 12),
            IntegerPoint::new(1, 12),
        ]);
        let bb = square.bounding_box().unwrap();
        assert_eq!(bb.width(), 10);
        assert_eq!(bb.height(), 10);
    }

    #[test]
    fn test_edges_includes_closing_segment() {
        let tri = IntegerPath::new(vec![
            IntegerPoint::new(0, 0),
            IntegerPoint::new(4, 0),
            IntegerPoint::new(0, 4),
        ]);
        let edges: Vec<_> = tri.edges().collect();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], (IntegerPoint::new(0, 4), IntegerPoint::new(0, 0)));
    }

    #[test]
    fn test_paths_bounding_box_union() {
        let a = IntegerPath::new(vec![
            IntegerPoint::new(0, 0),
            IntegerPoint::new(10, 0),
            IntegerPoint::new(10, 10),
            IntegerPoint::new(0, 10),
        ]);
        let b = IntegerPath::new(vec![
            IntegerPoint::new(20, 20),
            IntegerPoint::new(30, 20),
            IntegerPoint::new(30, 30),
            IntegerPoint::new(20, 30),
        ]);
        let paths = IntegerPaths::new(vec![a, b]);
        let bb = paths.bounding_box().unwrap();
        assert_eq!(bb.min_x, 0);
        assert_eq!(bb.max_x, 30);
    }
}
