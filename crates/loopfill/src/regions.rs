//! Region building - decide which loops are outlines and which are holes.
//!
//! Loops are nested into a containment forest. A loop's depth is the number
//! of loops around it; even depths are filled outlines, odd depths are
//! holes. An island inside a hole is an outline again and gets its own
//! region.

use crate::clip::rings_cross;
use crate::diagnostics::{Diagnostics, Issue};
use crate::error::{GeometryError, Result};
use crate::geometry::{Loop, Region};

/// Whether a loop bounds filled area or cuts it away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRole {
    Outer,
    Hole,
}

impl LoopRole {
    fn from_depth(depth: usize) -> Self {
        if depth % 2 == 0 { LoopRole::Outer } else { LoopRole::Hole }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoopRole::Outer => "outer",
            LoopRole::Hole => "hole",
        }
    }
}

/// Where one accepted loop sits in the containment forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopNesting {
    /// Index into the slice given to [`build_regions`]
    pub loop_index: usize,
    pub role: LoopRole,
    /// Smallest loop containing this one
    pub parent: Option<usize>,
    pub depth: usize,
}

/// Output of [`build_regions`].
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    /// One region per outline, in input loop order
    pub regions: Vec<Region>,
    /// One entry per accepted loop, in input loop order
    pub nesting: Vec<LoopNesting>,
    pub diagnostics: Diagnostics,
}

impl RegionSet {
    pub fn nesting_of(&self, loop_index: usize) -> Option<&LoopNesting> {
        self.nesting.iter().find(|n| n.loop_index == loop_index)
    }
}

/// Build fillable regions from closed loops.
///
/// Self-intersecting loops are rejected and duplicated loops dropped, both
/// recorded in the diagnostics. Boundaries that cross each other are kept
/// and nested by their interior points, with a `PartialOverlap` recorded.
///
/// Fails with `EmptyRegionSet` if `loops` is empty or nothing survives.
pub fn build_regions(loops: &[Loop]) -> Result<RegionSet> {
    if loops.is_empty() {
        return Err(GeometryError::EmptyRegionSet);
    }

    let mut diagnostics = Diagnostics::new();
    let kept = accepted_loops(loops, &mut diagnostics);
    if kept.is_empty() {
        return Err(GeometryError::EmptyRegionSet);
    }

    record_partial_overlaps(loops, &kept, &mut diagnostics);
    let nesting = nest(loops, &kept);

    let mut regions = Vec::new();
    for outer in nesting.iter().filter(|n| n.role == LoopRole::Outer) {
        let holes: Vec<Loop> = nesting
            .iter()
            .filter(|n| n.role == LoopRole::Hole && n.parent == Some(outer.loop_index))
            .map(|n| loops[n.loop_index].clone().with_winding(false))
            .collect();
        regions.push(Region::new(loops[outer.loop_index].clone().with_winding(true), holes));
    }

    log::debug!(
        "{} loop(s) -> {} region(s), {} hole(s)",
        loops.len(),
        regions.len(),
        regions.iter().map(|r| r.holes.len()).sum::<usize>()
    );

    Ok(RegionSet { regions, nesting, diagnostics })
}

/// Indices of loops that are simple and not repeats of an earlier loop.
fn accepted_loops(loops: &[Loop], diagnostics: &mut Diagnostics) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(loops.len());

    for (i, candidate) in loops.iter().enumerate() {
        if candidate.self_intersects() {
            let error = GeometryError::InvalidLoopGeometry("boundary intersects itself".to_string());
            log::warn!("rejecting loop #{}: {}", i, error);
            diagnostics.push(Issue::LoopRejected { loop_index: i, error });
            continue;
        }
        if let Some(&j) = kept.iter().find(|&&j| is_duplicate(candidate, &loops[j])) {
            log::warn!("dropping loop #{}: duplicates loop #{}", i, j);
            diagnostics.push(Issue::DuplicateLoop { loop_index: i, duplicate_of: j });
            continue;
        }
        kept.push(i);
    }

    kept
}

/// Same area and every vertex of each loop on the other's boundary.
fn is_duplicate(a: &Loop, b: &Loop) -> bool {
    let (ax0, ay0, ax1, ay1) = a.bounding_box();
    let (bx0, by0, bx1, by1) = b.bounding_box();
    let eps = 1e-6 * (ax1 - ax0).hypot(ay1 - ay0).max(1.0);

    let boxes_match = (ax0 - bx0).abs() <= eps
        && (ay0 - by0).abs() <= eps
        && (ax1 - bx1).abs() <= eps
        && (ay1 - by1).abs() <= eps;
    if !boxes_match {
        return false;
    }

    let (area_a, area_b) = (a.area(), b.area());
    if (area_a - area_b).abs() > 1e-6 * area_a.max(area_b).max(1.0) {
        return false;
    }

    a.vertices().iter().all(|&p| b.distance_to_boundary(p) <= eps)
        && b.vertices().iter().all(|&p| a.distance_to_boundary(p) <= eps)
}

fn record_partial_overlaps(loops: &[Loop], kept: &[usize], diagnostics: &mut Diagnostics) {
    let boxes: Vec<(f64, f64, f64, f64)> = kept.iter().map(|&i| loops[i].bounding_box()).collect();

    for a in 0..kept.len() {
        for b in a + 1..kept.len() {
            let (ax0, ay0, ax1, ay1) = boxes[a];
            let (bx0, by0, bx1, by1) = boxes[b];
            if ax1 < bx0 || bx1 < ax0 || ay1 < by0 || by1 < ay0 {
                continue;
            }
            let (i, j) = (kept[a], kept[b]);
            if rings_cross(loops[i].points(), loops[j].points()) {
                log::warn!("loop #{} partially overlaps loop #{}; nesting is best-effort", j, i);
                diagnostics.push(Issue::PartialOverlap { loop_index: j, other: i });
            }
        }
    }
}

/// Containment forest over the accepted loops.
///
/// Loop A is inside B when B is strictly larger and contains A's interior
/// point. The parent is the smallest such B.
fn nest(loops: &[Loop], kept: &[usize]) -> Vec<LoopNesting> {
    // Largest first, so every possible container is placed before its children.
    let mut by_area: Vec<usize> = kept.to_vec();
    by_area.sort_by(|&a, &b| loops[b].area().total_cmp(&loops[a].area()).then(a.cmp(&b)));

    let mut placed: Vec<LoopNesting> = Vec::with_capacity(by_area.len());
    for (k, &i) in by_area.iter().enumerate() {
        let inside = loops[i].interior_point();
        let area = loops[i].area();

        // Walk back from the smallest larger loop.
        let parent = by_area[..k]
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &j)| loops[j].area() > area && loops[j].contains(inside))
            .map(|(slot, &j)| (j, placed[slot].depth));

        let depth = parent.map_or(0, |(_, d)| d + 1);
        placed.push(LoopNesting {
            loop_index: i,
            role: LoopRole::from_depth(depth),
            parent: parent.map(|(j, _)| j),
            depth,
        });
    }

    placed.sort_by_key(|n| n.loop_index);
    placed
}

// ============================================================================
// TESTS
// ============================================================================
