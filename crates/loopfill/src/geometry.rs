//! Core geometry types for loopfill.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = lets you print with `{:?}`
//! - `Clone` = can duplicate the value
//! - `Copy` = can copy implicitly (small stack values only)
//! - `PartialEq` = can compare with `==`

use std::f64::consts::PI;

use crate::clip::{point_in_polygon, scanline_crossings, segments_intersect};
use crate::error::GeometryError;

/// Two vertices closer than this are the same vertex.
pub const VERTEX_EPSILON: f64 = 1e-9;

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A vertex of a fragment or loop.
pub type Vertex = Point;

/// A line segment defined by two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A fill or boundary segment.
pub type Segment = Line;

/// An ordered run of vertices produced from one source curve, or several
/// fragments chained together.
///
/// `closed` is the explicit flag from the source entity. It says nothing
/// about whether the endpoints actually coincide.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// A closed simple polygon boundary.
///
/// The stored points are explicitly closed: the last point is exactly equal
/// to the first. Use [`Loop::vertices`] for the distinct vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    points: Vec<Point>,
    /// Indices of the fragments this loop was assembled from.
    pub sources: Vec<usize>,
}

/// A filled area: an outer loop minus its holes.
///
/// ## Rust Lesson #4: Ownership & Vec
///
/// This struct OWNS its loops - when it's dropped, they're freed.
/// A `&Region` handed to the hatch generator is a read-only borrow,
/// so filling can never mutate the region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Outer boundary (counter-clockwise)
    pub outer: Loop,
    /// Holes (clockwise), each directly inside `outer`
    pub holes: Vec<Loop>,
}

// ============================================================================
// IMPLEMENTATIONS (methods)
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    #[inline]
    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Distance from this point to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

impl Fragment {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// An open two-vertex fragment.
    pub fn segment(start: Point, end: Point) -> Self {
        Self::new(vec![start, end], false)
    }

    /// First vertex. Fragments always hold at least one point once built
    /// by the flattener.
    #[inline]
    pub fn start(&self) -> Point {
        self.points[0]
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Distance between the two free ends.
    #[inline]
    pub fn gap(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Closed by flag, or by its ends lying within `closure_tolerance`.
    pub fn is_closed_within(&self, closure_tolerance: f64) -> bool {
        self.closed || self.gap() <= closure_tolerance
    }

    pub fn reversed(&self) -> Fragment {
        let mut points = self.points.clone();
        points.reverse();
        Fragment::new(points, self.closed)
    }
}

impl Loop {
    /// Build a loop from a closed run of points.
    ///
    /// The run is normalized before validation: consecutive duplicate
    /// vertices are collapsed, trailing vertices lying on the start are
    /// dropped, and the first vertex is appended so the loop closes exactly.
    ///
    /// Fails with `DegenerateLoop` if fewer than 3 distinct vertices remain
    /// or the enclosed area is zero.
    pub fn from_points(points: &[Point], sources: Vec<usize>) -> Result<Loop, GeometryError> {
        let mut ring: Vec<Point> = Vec::with_capacity(points.len() + 1);
        for &p in points {
            if ring.last().is_some_and(|last: &Point| last.distance(p) <= VERTEX_EPSILON) {
                continue;
            }
            ring.push(p);
        }
        while ring.len() > 1 && ring[0].distance(ring[ring.len() - 1]) <= VERTEX_EPSILON {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(GeometryError::DegenerateLoop(format!(
                "{} distinct vertices after closure, need at least 3",
                ring.len()
            )));
        }

        let area = signed_area_of_points(&ring);
        if area.abs() <= VERTEX_EPSILON * VERTEX_EPSILON || !area.is_finite() {
            return Err(GeometryError::DegenerateLoop(
                "loop encloses no area".to_string(),
            ));
        }

        ring.push(ring[0]);
        Ok(Loop { points: ring, sources })
    }

    /// Stored points, with the closing point repeated at the end.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Distinct vertices (closing point excluded).
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.points[..self.points.len() - 1]
    }

    /// Edges in order, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Signed area: positive for counter-clockwise winding.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(self.vertices())
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Same loop, opposite winding.
    pub fn reversed(&self) -> Loop {
        let mut points = self.points.clone();
        points.reverse();
        Loop { points, sources: self.sources.clone() }
    }

    /// This loop wound counter-clockwise (`ccw = true`) or clockwise.
    pub fn with_winding(self, ccw: bool) -> Loop {
        if self.is_clockwise() == ccw { self.reversed() } else { self }
    }

    /// Bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        bounding_box_of_points(self.vertices())
    }

    /// Ray-casting membership test.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(p.x, p.y, self.vertices())
    }

    /// Shortest distance from `p` to the boundary.
    pub fn distance_to_boundary(&self, p: Point) -> f64 {
        self.edges()
            .map(|(a, b)| p.distance_to_segment(a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// A point strictly inside the loop.
    ///
    /// Casts a horizontal scanline through the middle of the bounding box and
    /// returns the midpoint of the widest inside interval.
    pub fn interior_point(&self) -> Point {
        let (_, min_y, _, max_y) = self.bounding_box();
        let y = min_y + (max_y - min_y) * 0.5;
        let xs = scanline_crossings(y, &[self.vertices()]);

        xs.chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .max_by(|a, b| (a.1 - a.0).total_cmp(&(b.1 - b.0)))
            .map(|(x0, x1)| Point::new((x0 + x1) / 2.0, y))
            .unwrap_or_else(|| centroid_of_points(self.vertices()))
    }

    /// True if any two edges cross or touch other than at their shared
    /// vertex, or an edge doubles back over its neighbour.
    pub fn self_intersects(&self) -> bool {
        let edges: Vec<(Point, Point)> = self.edges().collect();
        let n = edges.len();

        // Spikes: adjacent edges that fold back onto each other.
        for i in 0..n {
            let (a, b) = edges[i];
            let (_, c) = edges[(i + 1) % n];
            let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
            let scale = a.distance(b) * b.distance(c);
            if cross.abs() <= VERTEX_EPSILON * scale && dot < 0.0 {
                return true;
            }
        }

        // Sweep over edges sorted by min x so only overlapping spans are tested.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| {
            edges[i].0.x.min(edges[i].1.x).total_cmp(&edges[j].0.x.min(edges[j].1.x))
        });

        for (k, &i) in order.iter().enumerate() {
            let (a, b) = edges[i];
            let max_x = a.x.max(b.x);
            for &j in &order[k + 1..] {
                let (c, d) = edges[j];
                if c.x.min(d.x) > max_x {
                    break;
                }
                let adjacent = (i + 1) % n == j || (j + 1) % n == i;
                if adjacent {
                    continue;
                }
                if segments_intersect(a, b, c, d) {
                    return true;
                }
            }
        }
        false
    }
}

impl Region {
    pub fn new(outer: Loop, holes: Vec<Loop>) -> Self {
        Self { outer, holes }
    }

    /// Outer loop followed by the holes.
    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Even-odd membership: inside the outer loop and not in any hole.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        if !self.outer.contains(p) {
            return false;
        }
        !self.holes.iter().any(|hole| hole.contains(p))
    }

    #[inline]
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        self.outer.bounding_box()
    }

    /// Filled area (outer minus holes).
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(Loop::area).sum::<f64>()
    }

    /// Average of the outer loop's vertices.
    pub fn centroid(&self) -> Point {
        centroid_of_points(self.outer.vertices())
    }
}

/// Rotation about the origin (0,0).
///
/// The hatch generator rotates a region into a frame where the fill lines
/// are horizontal, then rotates the results back with the inverse.
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    pub cos_a: f64,
    pub sin_a: f64,
}

impl Rotation {
    pub fn new(angle_rad: f64) -> Self {
        Self { cos_a: angle_rad.cos(), sin_a: angle_rad.sin() }
    }

    pub fn from_degrees(angle_degrees: f64) -> Self {
        Self::new(angle_degrees * PI / 180.0)
    }

    /// The rotation that undoes this one.
    pub fn inverse(&self) -> Self {
        Self { cos_a: self.cos_a, sin_a: -self.sin_a }
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.cos_a - p.y * self.sin_a,
            p.x * self.sin_a + p.y * self.cos_a,
        )
    }

    #[inline]
    pub fn apply_line(&self, line: &Line) -> Line {
        Line::from_points(self.apply(line.start()), self.apply(line.end()))
    }
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Bounding box as (min_x, min_y, max_x, max_y). Infinite for an empty slice.
pub fn bounding_box_of_points(points: &[Point]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    )
}

fn centroid_of_points(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    )
}

// ============================================================================
// TESTS
// ============================================================================
