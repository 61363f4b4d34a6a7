//! Curve flattening - turn loop source entities into fragments.
//!
//! Every supported drawing entity is described by a [`LoopSource`] variant,
//! and each variant has exactly one flattening strategy. Arcs (circles, arc
//! entities, ellipses and polyline bulges) go through `lyon_geom::Arc`,
//! which picks its own step count for a given chordal tolerance. Splines are
//! handled in [`crate::spline`].

use std::f64::consts::{PI, TAU};

use lyon_geom::{Angle, Arc, point, vector};

use crate::config::validate_chordal_tolerance;
use crate::error::{GeometryError, Result};
use crate::geometry::{Fragment, Point, VERTEX_EPSILON};
use crate::spline::Spline;

/// Bulges smaller than this are straight segments.
const BULGE_EPSILON: f64 = 1e-12;

/// A polyline vertex with the DXF bulge of the segment that starts at it.
///
/// Bulge = tan(included angle / 4); positive means counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineVertex {
    pub point: Point,
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(point: Point, bulge: f64) -> Self {
        Self { point, bulge }
    }

    pub fn straight(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), 0.0)
    }
}

/// A curve entity that may bound (part of) a region.
///
/// ## Rust Lesson #10: Enums (Sum Types)
///
/// Each variant carries its own data, and `match` must handle all of them.
/// Adding a new entity kind is a compile error everywhere it isn't handled
/// yet - no entity type can be silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopSource {
    Circle {
        center: Point,
        radius: f64,
    },
    /// Counter-clockwise arc, angles in degrees.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// Elliptical arc, parameters in radians. `major_axis` is relative to
    /// the center; the minor axis is `ratio` times its length.
    Ellipse {
        center: Point,
        major_axis: Point,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    },
    Polyline {
        vertices: Vec<PolylineVertex>,
        closed: bool,
    },
    Spline(Spline),
}

impl LoopSource {
    /// Straight open segment (a DXF LINE).
    pub fn line(start: Point, end: Point) -> Self {
        LoopSource::Polyline {
            vertices: vec![PolylineVertex::new(start, 0.0), PolylineVertex::new(end, 0.0)],
            closed: false,
        }
    }

    /// Polyline through `points` with no bulges.
    pub fn polyline(points: &[Point], closed: bool) -> Self {
        LoopSource::Polyline {
            vertices: points.iter().map(|&p| PolylineVertex::new(p, 0.0)).collect(),
            closed,
        }
    }

    /// Entity kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            LoopSource::Circle { .. } => "circle",
            LoopSource::Arc { .. } => "arc",
            LoopSource::Ellipse { .. } => "ellipse",
            LoopSource::Polyline { .. } => "polyline",
            LoopSource::Spline(_) => "spline",
        }
    }

    /// The closed attribute carried by the source entity itself.
    pub fn explicit_closed(&self) -> bool {
        match self {
            LoopSource::Circle { .. } => true,
            LoopSource::Arc { .. } => false,
            LoopSource::Ellipse { start_param, end_param, .. } => is_full_turn(end_param - start_param),
            LoopSource::Polyline { closed, .. } => *closed,
            LoopSource::Spline(spline) => spline.closed,
        }
    }
}

/// Flatten one source entity into a fragment.
///
/// The maximum distance between the returned chords and the true curve is
/// at most `chordal_tolerance`. Flattening is deterministic: the same input
/// always yields the same vertex list.
///
/// Fails with `UnsupportedGeometry` for degenerate input (zero radius,
/// fewer than 2 vertices, non-finite coordinates). The caller is expected to
/// skip such entities and carry on.
pub fn flatten(source: &LoopSource, chordal_tolerance: f64) -> Result<Fragment> {
    validate_chordal_tolerance(chordal_tolerance)?;

    let fragment = match source {
        LoopSource::Circle { center, radius } => {
            check_radius(*radius)?;
            let arc = circular_arc(*center, *radius, 0.0, TAU);
            Fragment::new(arc_points(&arc, chordal_tolerance), true)
        }
        LoopSource::Arc { center, radius, start_angle, end_angle } => {
            check_radius(*radius)?;
            let sweep = ccw_sweep(end_angle.to_radians() - start_angle.to_radians());
            let arc = circular_arc(*center, *radius, start_angle.to_radians(), sweep);
            Fragment::new(arc_points(&arc, chordal_tolerance), false)
        }
        LoopSource::Ellipse { center, major_axis, ratio, start_param, end_param } => {
            let major = major_axis.x.hypot(major_axis.y);
            check_radius(major)?;
            check_radius(*ratio)?;
            let sweep = ccw_sweep(end_param - start_param);
            let arc = Arc {
                center: point(center.x, center.y),
                radii: vector(major, major * ratio),
                start_angle: Angle::radians(*start_param),
                sweep_angle: Angle::radians(sweep),
                x_rotation: Angle::radians(major_axis.y.atan2(major_axis.x)),
            };
            Fragment::new(arc_points(&arc, chordal_tolerance), is_full_turn(sweep))
        }
        LoopSource::Polyline { vertices, closed } => {
            Fragment::new(polyline_points(vertices, *closed, chordal_tolerance), *closed)
        }
        LoopSource::Spline(spline) => Fragment::new(spline.flatten(chordal_tolerance)?, spline.closed),
    };

    if fragment.points.len() < 2 {
        return Err(GeometryError::UnsupportedGeometry(format!(
            "{} flattened to {} vertices",
            source.kind(),
            fragment.points.len()
        )));
    }
    if fragment.points.iter().any(|p| !p.is_finite()) {
        return Err(GeometryError::UnsupportedGeometry(format!(
            "{} has non-finite coordinates",
            source.kind()
        )));
    }

    Ok(fragment)
}

fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeometryError::UnsupportedGeometry(format!("radius {} is not positive", radius)));
    }
    Ok(())
}

/// Normalize a sweep to (0, 2π]; a zero sweep means a full turn.
fn ccw_sweep(sweep: f64) -> f64 {
    let s = sweep.rem_euclid(TAU);
    if s <= VERTEX_EPSILON { TAU } else { s }
}

fn is_full_turn(sweep: f64) -> bool {
    let s = sweep.abs();
    s <= VERTEX_EPSILON || (s - TAU).abs() <= VERTEX_EPSILON
}

fn circular_arc(center: Point, radius: f64, start: f64, sweep: f64) -> Arc<f64> {
    Arc {
        center: point(center.x, center.y),
        radii: vector(radius, radius),
        start_angle: Angle::radians(start),
        sweep_angle: Angle::radians(sweep),
        x_rotation: Angle::zero(),
    }
}

/// All vertices of a flattened arc, start point included.
fn arc_points(arc: &Arc<f64>, tolerance: f64) -> Vec<Point> {
    let from = arc.from();
    let mut points = vec![Point::new(from.x, from.y)];
    push_arc(&mut points, arc, tolerance);
    points
}

/// Append a flattened arc, start point excluded.
fn push_arc(points: &mut Vec<Point>, arc: &Arc<f64>, tolerance: f64) {
    // Callback receives LineSegment, we take the endpoint of each segment
    arc.for_each_flattened(tolerance, &mut |segment| {
        points.push(Point::new(segment.to.x, segment.to.y));
    });
}

/// Arc through a bulged polyline segment from `a` to `b`.
///
/// Included angle θ = 4·atan(bulge); the center sits on the chord's
/// perpendicular bisector at (chord/2)·cot(θ/2) to the left of a->b.
fn bulge_arc(a: Point, b: Point, bulge: f64) -> Option<Arc<f64>> {
    let chord = a.distance(b);
    if bulge.abs() < BULGE_EPSILON || chord <= VERTEX_EPSILON {
        return None;
    }

    let (ux, uy) = ((b.x - a.x) / chord, (b.y - a.y) / chord);
    let offset = chord * (1.0 - bulge * bulge) / (4.0 * bulge);
    let center = Point::new((a.x + b.x) / 2.0 - uy * offset, (a.y + b.y) / 2.0 + ux * offset);
    let radius = chord * (1.0 + bulge * bulge) / (4.0 * bulge.abs());
    let start = (a.y - center.y).atan2(a.x - center.x);

    Some(circular_arc(center, radius, start, 4.0 * bulge.atan()))
}

fn polyline_points(vertices: &[PolylineVertex], closed: bool, tolerance: f64) -> Vec<Point> {
    let n = vertices.len();
    if n == 0 {
        return Vec::new();
    }

    let mut points = vec![vertices[0].point];
    let segments = if closed { n } else { n - 1 };

    for i in 0..segments {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let closing = i + 1 == n;

        match bulge_arc(a.point, b.point, a.bulge) {
            Some(arc) => {
                push_arc(&mut points, &arc, tolerance);
                // Land exactly on the vertex, not on its floating-point twin.
                if let Some(last) = points.last_mut() {
                    *last = b.point;
                }
            }
            // The straight closing edge is implied by the closed flag.
            None if closing => {}
            None => points.push(b.point),
        }
    }

    points
}

// ============================================================================
// TESTS
// ============================================================================
