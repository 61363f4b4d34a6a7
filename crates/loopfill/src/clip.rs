//! Low-level intersection tests shared by the region builder and the
//! hatch generator.
//!
//! This is the HOT PATH - the scanline crossing test below runs once per
//! hatch line per ring.

use crate::geometry::Point;

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================
//
// ## Rust Lesson #8: References & Slices
//
// `&[Point]` is a "slice" - a borrowed view into a contiguous sequence.
// It works with Vec<Point>, arrays, or any contiguous memory.

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside.
#[inline]
pub fn point_in_polygon(px: f64, py: f64, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);

        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

// ============================================================================
// SCANLINE CROSSINGS
// ============================================================================

/// X coordinates where the horizontal line `y` crosses the rings, sorted.
///
/// Uses the same half-open rule as [`point_in_polygon`]: an edge counts
/// when exactly one of its endpoints lies strictly above `y`. Horizontal
/// edges never count and a vertex touching the scanline from one side counts
/// once or not at all, so the result always has even length and pairs up
/// as (enter, leave) intervals under the even-odd rule.
///
/// Each ring is the list of distinct vertices; the closing edge is implied.
pub fn scanline_crossings(y: f64, rings: &[&[Point]]) -> Vec<f64> {
    let mut xs = Vec::new();

    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (ring[j], ring[i]);
            if (a.y > y) != (b.y > y) {
                xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
            j = i;
        }
    }

    // ## Rust Lesson #11: total_cmp
    //
    // f64 is only PartialOrd (NaN!), so `sort()` won't compile.
    // `total_cmp` gives a total order we can sort by.
    xs.sort_by(f64::total_cmp);
    xs
}

// ============================================================================
// SEGMENT-SEGMENT INTERSECTION
// ============================================================================

/// Orientation of `c` relative to the directed line `a`->`b`.
///
/// Positive = left turn, negative = right turn, zero = collinear.
#[inline]
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn within_box(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// True if segments `a`-`b` and `c`-`d` share at least one point.
///
/// Touching endpoints and collinear overlaps count as intersections.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_box(c, d, a))
        || (d2 == 0.0 && within_box(c, d, b))
        || (d3 == 0.0 && within_box(a, b, c))
        || (d4 == 0.0 && within_box(a, b, d))
}

/// True if any edge of ring `a` meets any edge of ring `b`.
///
/// Rings are closed point lists (last point equal to the first).
pub fn rings_cross(a: &[Point], b: &[Point]) -> bool {
    for ea in a.windows(2) {
        let (a_min_x, a_max_x) = (ea[0].x.min(ea[1].x), ea[0].x.max(ea[1].x));
        let (a_min_y, a_max_y) = (ea[0].y.min(ea[1].y), ea[0].y.max(ea[1].y));
        for eb in b.windows(2) {
            if eb[0].x.max(eb[1].x) < a_min_x
                || eb[0].x.min(eb[1].x) > a_max_x
                || eb[0].y.max(eb[1].y) < a_min_y
                || eb[0].y.min(eb[1].y) > a_max_y
            {
                continue;
            }
            if segments_intersect(ea[0], ea[1], eb[0], eb[1]) {
                return true;
            }
        }
    }
    false
}

// ============================================================================
// TESTS
// ============================================================================
