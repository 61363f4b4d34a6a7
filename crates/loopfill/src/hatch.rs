//! Hatch line generation - parallel fill lines clipped to a region.
//!
//! ## Algorithm
//!
//! Rather than clipping arbitrary angled lines, the region is rotated so the
//! fill direction becomes horizontal. Each horizontal scanline is cut against
//! the outer ring alone, then every hole's own intervals are subtracted, and
//! the surviving pieces are rotated back. Working per ring keeps the fill
//! inside the outer boundary even when a hole pokes out of it.
//!
//! Scanlines are independent, so they run in parallel with rayon. Output order
//! is still the scanline order.

use rayon::prelude::*;

use crate::clip::scanline_crossings;
use crate::config::FillSpec;
use crate::error::{GeometryError, Result};
use crate::geometry::{Line, Point, Region, Rotation, bounding_box_of_points};

/// Pieces shorter than this are grazing touches, not fill.
const MIN_PIECE_LENGTH: f64 = 1e-9;

/// Upper bound on scanlines per region.
pub const MAX_SCANLINES: f64 = 1e7;

/// Generate fill lines for one region.
///
/// Fails with `InvalidSpacing` or `InvalidAngleRange` before touching any
/// geometry, and with `TooManyScanlines` when the spacing is so fine for the
/// region's size that the scanline count would not fit in memory. A region too
/// thin for any scanline yields an empty list.
pub fn generate_fill(region: &Region, spec: &FillSpec) -> Result<Vec<Line>> {
    spec.validate()?;

    let to_horizontal = Rotation::from_degrees(-spec.angle);
    let back = to_horizontal.inverse();

    let rotate = |points: &[Point]| -> Vec<Point> { points.iter().map(|&p| to_horizontal.apply(p)).collect() };
    let outer = rotate(region.outer.vertices());
    let holes: Vec<Vec<Point>> = region.holes.iter().map(|h| rotate(h.vertices())).collect();

    let (_, min_y, _, max_y) = bounding_box_of_points(&outer);
    let margin = 2.0 * spec.spacing;
    let start = min_y - margin;
    let stop = max_y + margin;
    let scanlines = ((stop - start + MIN_PIECE_LENGTH) / spec.spacing).floor() + 1.0;
    if !scanlines.is_finite() || scanlines > MAX_SCANLINES {
        return Err(GeometryError::TooManyScanlines(scanlines));
    }
    let count = scanlines as usize;

    let per_scanline: Vec<Vec<Line>> = (0..count)
        .into_par_iter()
        .map(|i| {
            let y = start + i as f64 * spec.spacing;
            let hole_spans = merge_spans(holes.iter().flat_map(|h| ring_spans(y, h)).collect());
            subtract_spans(&ring_spans(y, &outer), &hole_spans)
                .into_iter()
                .filter(|&(x0, x1)| x1 - x0 > MIN_PIECE_LENGTH)
                .map(|(x0, x1)| back.apply_line(&Line::new(x0, y, x1, y)))
                .collect()
        })
        .collect();

    let lines: Vec<Line> = per_scanline.into_iter().flatten().collect();
    log::debug!("{} scanline(s) -> {} fill line(s)", count, lines.len());
    Ok(lines)
}

/// Inside intervals of one ring along the scanline at `y`, sorted.
fn ring_spans(y: f64, ring: &[Point]) -> Vec<(f64, f64)> {
    scanline_crossings(y, &[ring]).chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Union of possibly overlapping intervals, sorted and disjoint.
fn merge_spans(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (x0, x1) in spans {
        match merged.last_mut() {
            Some(last) if x0 <= last.1 => last.1 = last.1.max(x1),
            _ => merged.push((x0, x1)),
        }
    }
    merged
}

/// `spans` minus `cuts`; both sorted, `cuts` disjoint.
fn subtract_spans(spans: &[(f64, f64)], cuts: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(spans.len() + cuts.len());
    for &(x0, x1) in spans {
        let mut cursor = x0;
        for &(c0, c1) in cuts {
            if c1 <= cursor {
                continue;
            }
            if c0 >= x1 {
                break;
            }
            if c0 > cursor {
                out.push((cursor, c0));
            }
            cursor = cursor.max(c1);
        }
        if cursor < x1 {
            out.push((cursor, x1));
        }
    }
    out
}

/// Fill every region, concatenating the results in region order.
pub fn generate_fill_all(regions: &[Region], spec: &FillSpec) -> Result<Vec<Line>> {
    spec.validate()?;
    let mut lines = Vec::new();
    for region in regions {
        lines.extend(generate_fill(region, spec)?);
    }
    Ok(lines)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::geometry::Loop;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Loop {
        let points = [Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1), Point::new(x0, y1)];
        Loop::from_points(&points, vec![]).unwrap()
    }

    fn circle(r: f64) -> Loop {
        let points: Vec<Point> = (0..96)
            .map(|i| {
                let a = TAU * i as f64 / 96.0;
                Point::new(r * a.cos(), r * a.sin())
            })
            .collect();
        Loop::from_points(&points, vec![]).unwrap()
    }

    fn annulus() -> Region {
        Region::new(circle(10.0), vec![circle(5.0).with_winding(false)])
    }

    #[test]
    fn horizontal_fill_of_rectangle() {
        let region = Region::new(rect(0.0, 0.0, 20.0, 10.0), vec![]);
        let spec = FillSpec::new(1.0, 0.0).unwrap();
        let lines = generate_fill(&region, &spec).unwrap();

        // floor(H / S) + 1, give or take the scanline on the top edge.
        let expected = (10.0_f64 / 1.0).floor() as usize + 1;
        assert!(lines.len().abs_diff(expected) <= 1, "got {} lines", lines.len());
        for line in &lines {
            assert_relative_eq!(line.y1, line.y2, epsilon = 1e-9);
            assert_relative_eq!(line.length(), 20.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn lines_follow_the_angle() {
        let region = Region::new(rect(0.0, 0.0, 50.0, 50.0), vec![]);
        for angle in [30.0, 45.0, 90.0, 135.0] {
            let lines = generate_fill(&region, &FillSpec::new(2.0, angle).unwrap()).unwrap();
            assert!(!lines.is_empty());
            let expected = f64::to_radians(angle);
            for line in &lines {
                let mut actual = (line.y2 - line.y1).atan2(line.x2 - line.x1);
                if actual < 0.0 {
                    actual += std::f64::consts::PI;
                }
                assert!(
                    (actual - expected).abs() < 1e-6 || (actual - expected).abs() > std::f64::consts::PI - 1e-6,
                    "angle {} gave a line at {} rad",
                    angle,
                    actual
                );
            }
        }
    }

    #[test]
    fn fill_stays_inside_and_skips_the_hole() {
        let region = annulus();
        let lines = generate_fill(&region, &FillSpec::new(0.5, 45.0).unwrap()).unwrap();
        assert!(!lines.is_empty());

        // Slivers at a tangent are too thin to classify their midpoint reliably.
        for line in lines.iter().filter(|l| l.length() > 1e-3) {
            let mid = line.midpoint();
            // A chord tangent to the hole has its midpoint on the hole's vertex.
            let on_boundary = region.loops().any(|l| l.distance_to_boundary(mid) < 1e-9);
            assert!(on_boundary || region.contains(mid), "midpoint {:?} outside the ring", mid);
            for end in [line.start(), line.end()] {
                let on_boundary = region.loops().any(|l| l.distance_to_boundary(end) < 1e-6);
                assert!(on_boundary, "endpoint {:?} not on a boundary", end);
            }
        }
    }

    #[test]
    fn scanline_through_hole_splits_in_two() {
        let region = annulus();
        let lines = generate_fill(&region, &FillSpec::new(1.0, 0.0).unwrap()).unwrap();
        // The scanline at y = 0 crosses the hole.
        let at_zero: Vec<&Line> = lines.iter().filter(|l| l.y1.abs() < 1e-9).collect();
        assert_eq!(at_zero.len(), 2, "got {:?}", at_zero);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let region = Region::new(rect(0.0, 0.0, 1.0, 1.0), vec![]);
        let bad_spacing = FillSpec { spacing: 0.0, angle: 0.0 };
        let bad_angle = FillSpec { spacing: 1.0, angle: 180.0 };

        assert_eq!(generate_fill(&region, &bad_spacing), Err(GeometryError::InvalidSpacing(0.0)));
        assert_eq!(generate_fill(&region, &bad_angle), Err(GeometryError::InvalidAngleRange(180.0)));
    }

    #[test]
    fn grazing_vertices_give_no_pieces() {
        // Scanlines at y = 0 and y = 4 only touch the diamond's tips.
        let diamond = Loop::from_points(
            &[Point::new(0.0, 0.0), Point::new(2.0, 2.0), Point::new(0.0, 4.0), Point::new(-2.0, 2.0)],
            vec![],
        )
        .unwrap();
        let lines = generate_fill(&Region::new(diamond, vec![]), &FillSpec::new(1.0, 0.0).unwrap()).unwrap();

        assert_eq!(lines.len(), 3, "got {:?}", lines);
        assert!(lines.iter().all(|l| l.length() > 1.0));
    }

    #[test]
    fn fill_is_deterministic() {
        let region = annulus();
        let spec = FillSpec::new(0.3, 60.0).unwrap();
        assert_eq!(generate_fill(&region, &spec).unwrap(), generate_fill(&region, &spec).unwrap());
    }

    #[test]
    fn fill_all_keeps_region_order() {
        let regions = vec![
            Region::new(rect(0.0, 0.0, 10.0, 10.0), vec![]),
            Region::new(rect(100.0, 0.0, 110.0, 10.0), vec![]),
        ];
        let lines = generate_fill_all(&regions, &FillSpec::new(1.0, 0.0).unwrap()).unwrap();
        let first_far = lines.iter().position(|l| l.x1 >= 100.0).unwrap();
        assert!(lines[..first_far].iter().all(|l| l.x1 < 100.0));
        assert!(lines[first_far..].iter().all(|l| l.x1 >= 100.0));
    }

    #[test]
    fn hole_poking_out_never_fills_outside() {
        // The "hole" crosses the right edge of the outline and reaches x = 12.
        let region = Region::new(rect(0.0, 0.0, 10.0, 10.0), vec![rect(7.0, 2.0, 12.0, 8.0).with_winding(false)]);
        let lines = generate_fill(&region, &FillSpec::new(1.0, 0.0).unwrap()).unwrap();

        assert!(!lines.is_empty());
        for line in &lines {
            for p in [line.start(), line.end()] {
                assert!(p.x > -1e-9 && p.x < 10.0 + 1e-9, "fill line {:?} leaves the outline", line);
            }
            let mid = line.midpoint();
            let in_hole = mid.x > 7.0 && mid.y > 2.0 && mid.y < 8.0;
            assert!(!in_hole, "fill line {:?} runs through the hole", line);
        }
        // Rows through the hole stop at its left edge.
        let at_five: Vec<&Line> = lines.iter().filter(|l| (l.y1 - 5.0).abs() < 1e-9).collect();
        assert_eq!(at_five.len(), 1);
        assert_relative_eq!(at_five[0].x1.max(at_five[0].x2), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn overlapping_holes_cut_once() {
        let region = Region::new(
            rect(0.0, 0.0, 20.0, 10.0),
            vec![rect(4.0, 2.0, 10.0, 8.0).with_winding(false), rect(8.0, 3.0, 14.0, 7.0).with_winding(false)],
        );
        let lines = generate_fill(&region, &FillSpec::new(1.0, 0.0).unwrap()).unwrap();
        let at_five: Vec<(f64, f64)> = lines
            .iter()
            .filter(|l| (l.y1 - 5.0).abs() < 1e-9)
            .map(|l| (l.x1.min(l.x2), l.x1.max(l.x2)))
            .collect();
        assert_eq!(at_five, vec![(0.0, 4.0), (14.0, 20.0)]);
    }

    #[test]
    fn absurdly_fine_spacing_is_an_error() {
        let region = Region::new(rect(0.0, 0.0, 10.0, 10.0), vec![]);
        let spec = FillSpec::new(1e-300, 0.0).unwrap();
        assert!(matches!(generate_fill(&region, &spec), Err(GeometryError::TooManyScanlines(_))));

        let spec = FillSpec::new(1e-7, 0.0).unwrap();
        assert!(matches!(generate_fill(&region, &spec), Err(GeometryError::TooManyScanlines(_))));
    }

    #[test]
    fn span_arithmetic() {
        assert_eq!(merge_spans(vec![(5.0, 6.0), (0.0, 2.0), (1.0, 3.0)]), vec![(0.0, 3.0), (5.0, 6.0)]);
        assert_eq!(subtract_spans(&[(0.0, 10.0)], &[(-1.0, 1.0), (4.0, 5.0), (9.0, 12.0)]), vec![(1.0, 4.0), (5.0, 9.0)]);
        assert_eq!(subtract_spans(&[(0.0, 1.0), (2.0, 3.0)], &[]), vec![(0.0, 1.0), (2.0, 3.0)]);
    }
}
