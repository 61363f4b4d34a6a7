//! Loop assembly - join touching fragments into closed loops.
//!
//! Drawings rarely store a shape as one closed entity. A rounded rectangle
//! is four lines and four arcs, and their endpoints only agree to within a
//! few thousandths. This module chains fragments end to end until each
//! chain closes, and reports the ones that never do.
//!
//! # Algorithm
//!
//! 1. Fragments that are already closed become candidate loops directly
//! 2. Build a spatial hash of the open fragments' endpoints
//! 3. For each unused open fragment (input order), start a new chain
//! 4. Extend the chain's tail with the nearest unused endpoint in range
//! 5. Then extend its head the same way
//! 6. Stop as soon as the chain's two ends meet
//!
//! # Performance
//!
//! O(n) average with spatial hashing, O(n²) worst case if all endpoints
//! hash to the same cell.

use std::collections::HashMap;

use crate::config::ToleranceSpec;
use crate::diagnostics::{Diagnostics, Issue};
use crate::geometry::{Fragment, Loop, Point, VERTEX_EPSILON};

/// Smallest grid cell, so a zero merge tolerance doesn't divide by zero.
const MIN_CELL_SIZE: f64 = 0.001;

/// A run of vertices built from one or more fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub points: Vec<Point>,
    /// Indices of the fragments used, in no particular order
    pub fragments: Vec<usize>,
}

impl Chain {
    fn start(&self) -> Point {
        self.points[0]
    }

    fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    fn closes_within(&self, closure_tolerance: f64) -> bool {
        self.start().distance(self.end()) <= closure_tolerance
    }

    /// Append `points`, skipping a leading vertex that duplicates our end.
    fn push_back(&mut self, points: impl IntoIterator<Item = Point>) {
        for p in points {
            if self.end().distance(p) <= VERTEX_EPSILON {
                continue;
            }
            self.points.push(p);
        }
    }

    /// Prepend `points` (given in chain order), skipping a trailing vertex
    /// that duplicates our start.
    fn push_front(&mut self, points: &[Point]) {
        let mut head: Vec<Point> = points.to_vec();
        if head.last().is_some_and(|p| p.distance(self.start()) <= VERTEX_EPSILON) {
            head.pop();
        }
        head.append(&mut self.points);
        self.points = head;
    }
}

/// Output of [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub loops: Vec<Loop>,
    pub open_chains: Vec<Chain>,
    pub diagnostics: Diagnostics,
}

/// Which end of a fragment a grid entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Start,
    End,
}

type Grid = HashMap<(i64, i64), Vec<(usize, End)>>;

/// Assemble fragments into closed loops.
///
/// Inputs are not modified. The same fragments and tolerances always give
/// the same loops in the same order, and no fragment ends up in two loops.
pub fn assemble(fragments: &[Fragment], tolerance: &ToleranceSpec) -> Assembly {
    let mut assembly = Assembly::default();
    let mut open = Vec::new();

    for (i, fragment) in fragments.iter().enumerate() {
        if fragment.points.is_empty() || fragment.is_closed_within(tolerance.closure_tolerance) {
            accept_loop(&mut assembly, &fragment.points, vec![i]);
        } else {
            open.push(i);
        }
    }

    let cell = tolerance.merge_tolerance.max(MIN_CELL_SIZE);
    let mut grid: Grid = HashMap::new();
    for &i in &open {
        let fragment = &fragments[i];
        grid.entry(point_to_cell(fragment.start(), cell)).or_default().push((i, End::Start));
        grid.entry(point_to_cell(fragment.end(), cell)).or_default().push((i, End::End));
    }

    let lookup = Lookup {
        fragments,
        grid: &grid,
        cell,
        merge_sq: tolerance.merge_tolerance * tolerance.merge_tolerance,
    };
    let mut used = vec![false; fragments.len()];

    for &seed in &open {
        if used[seed] {
            continue;
        }
        used[seed] = true;

        let mut chain = Chain { points: fragments[seed].points.clone(), fragments: vec![seed] };
        let closure = tolerance.closure_tolerance;

        // Grow the tail: a matching start is appended as-is, a matching end reversed.
        while !chain.closes_within(closure) {
            let Some((next, end)) = lookup.nearest(chain.end(), &used) else {
                break;
            };
            used[next] = true;
            chain.fragments.push(next);
            let points = &fragments[next].points;
            match end {
                End::Start => chain.push_back(points.iter().copied()),
                End::End => chain.push_back(points.iter().rev().copied()),
            }
        }

        // Grow the head: a matching end is prepended as-is, a matching start reversed.
        while !chain.closes_within(closure) {
            let Some((prev, end)) = lookup.nearest(chain.start(), &used) else {
                break;
            };
            used[prev] = true;
            chain.fragments.push(prev);
            match end {
                End::End => chain.push_front(&fragments[prev].points),
                End::Start => chain.push_front(&fragments[prev].reversed().points),
            }
        }

        if chain.closes_within(closure) {
            accept_loop(&mut assembly, &chain.points, chain.fragments);
        } else {
            log::debug!(
                "open chain of {} fragment(s), gap {:.4}",
                chain.fragments.len(),
                chain.start().distance(chain.end())
            );
            assembly.diagnostics.push(Issue::OpenChain { fragments: chain.fragments.clone() });
            assembly.open_chains.push(chain);
        }
    }

    log::debug!(
        "assembled {} fragment(s) into {} loop(s), {} open chain(s)",
        fragments.len(),
        assembly.loops.len(),
        assembly.open_chains.len()
    );
    assembly
}

/// Validate a closed run and keep it, or record why it was thrown away.
fn accept_loop(assembly: &mut Assembly, points: &[Point], sources: Vec<usize>) {
    match Loop::from_points(points, sources.clone()) {
        Ok(l) => assembly.loops.push(l),
        Err(error) => {
            log::warn!("discarding loop from fragment(s) {:?}: {}", sources, error);
            assembly.diagnostics.push(Issue::LoopDiscarded { fragments: sources, error });
        }
    }
}

/// Convert a point to a grid cell coordinate.
#[inline]
fn point_to_cell(p: Point, cell: f64) -> (i64, i64) {
    ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64)
}

/// Endpoint search over the spatial hash.
struct Lookup<'a> {
    fragments: &'a [Fragment],
    grid: &'a Grid,
    cell: f64,
    merge_sq: f64,
}

impl Lookup<'_> {
    /// Nearest unused endpoint within merge tolerance of `p`.
    ///
    /// Ties go to the lower fragment index, then to its start point.
    fn nearest(&self, p: Point, used: &[bool]) -> Option<(usize, End)> {
        let (cx, cy) = point_to_cell(p, self.cell);
        let mut best: Option<(f64, usize, End)> = None;

        // Check this cell and all 8 neighbors (endpoints might be in adjacent cells)
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(candidates) = self.grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &(idx, end) in candidates {
                    if used[idx] {
                        continue;
                    }
                    let fragment = &self.fragments[idx];
                    let q = match end {
                        End::Start => fragment.start(),
                        End::End => fragment.end(),
                    };
                    let d = p.distance_sq(q);
                    if d > self.merge_sq {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((bd, bi, be)) => {
                            d < bd || (d == bd && (idx < bi || (idx == bi && end == End::Start && be == End::End)))
                        }
                    };
                    if better {
                        best = Some((d, idx, end));
                    }
                }
            }
        }

        best.map(|(_, idx, end)| (idx, end))
    }
}

// ============================================================================
// TESTS
// ============================================================================
