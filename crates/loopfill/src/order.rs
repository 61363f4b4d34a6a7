//! Region ordering for shorter laser head travel.
//!
//! The controller fills regions one after another, and the head jumps
//! between them with the beam off. Filling neighbours back to back keeps
//! those jumps short.
//!
//! ## Algorithms
//!
//! - **Document**: regions in the order their outlines appear in the drawing
//! - **Nearest Neighbor**: greedy, O(n²) but usually good enough

use std::str::FromStr;

use crate::geometry::{Point, Region};

/// Order regions using the nearest-neighbor heuristic.
///
/// Starts from the region whose centroid is nearest the origin (where the
/// head parks), then repeatedly picks the nearest unvisited centroid. Ties
/// go to the lower index, so the result is deterministic.
///
/// Returns indices into `regions`.
pub fn order_nearest_neighbor(regions: &[Region]) -> Vec<usize> {
    let n = regions.len();
    if n <= 1 {
        return (0..n).collect();
    }

    let centroids: Vec<Point> = regions.iter().map(Region::centroid).collect();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = Point::new(0.0, 0.0);

    for _ in 0..n {
        let next = (0..n)
            .filter(|&i| !visited[i])
            .min_by(|&a, &b| {
                current
                    .distance_sq(centroids[a])
                    .total_cmp(&current.distance_sq(centroids[b]))
                    .then(a.cmp(&b))
            });
        let Some(next) = next else { break };

        visited[next] = true;
        order.push(next);
        current = centroids[next];
    }

    order
}

/// Total centroid-to-centroid travel for a given order.
pub fn calculate_travel_distance(regions: &[Region], order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|w| regions[w[0]].centroid().distance(regions[w[1]].centroid()))
        .sum()
}

/// Ordering strategy for regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingStrategy {
    /// Keep drawing order
    Document,
    /// Nearest neighbor greedy optimization
    #[default]
    NearestNeighbor,
}

impl FromStr for OrderingStrategy {
    type Err = String;

    /// Accepts "document" (or "doc") and "nearest" (or "nn"), any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" | "doc" => Ok(OrderingStrategy::Document),
            "nearest" | "nn" => Ok(OrderingStrategy::NearestNeighbor),
            other => Err(format!("unknown order '{}', use 'document' or 'nearest'", other)),
        }
    }
}

/// Apply an ordering strategy to get region indices.
pub fn order_regions(regions: &[Region], strategy: OrderingStrategy) -> Vec<usize> {
    match strategy {
        OrderingStrategy::Document => (0..regions.len()).collect(),
        OrderingStrategy::NearestNeighbor => order_nearest_neighbor(regions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Loop;

    fn square_at(x: f64, y: f64, size: f64) -> Region {
        let outer = Loop::from_points(
            &[
                Point::new(x, y),
                Point::new(x + size, y),
                Point::new(x + size, y + size),
                Point::new(x, y + size),
            ],
            vec![],
        )
        .unwrap();
        Region::new(outer, vec![])
    }

    #[test]
    fn nearest_neighbor_reduces_travel() {
        // Zigzag: document order bounces left and right.
        let regions = vec![
            square_at(0.0, 0.0, 10.0),
            square_at(100.0, 0.0, 10.0),
            square_at(10.0, 10.0, 10.0),
            square_at(90.0, 10.0, 10.0),
        ];

        let doc_order: Vec<usize> = (0..regions.len()).collect();
        let nn_order = order_nearest_neighbor(&regions);

        let doc_travel = calculate_travel_distance(&regions, &doc_order);
        let nn_travel = calculate_travel_distance(&regions, &nn_order);
        assert!(nn_travel < doc_travel, "NN travel {} should beat doc travel {}", nn_travel, doc_travel);
        assert_eq!(nn_order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn order_is_a_permutation() {
        let regions: Vec<Region> = (0..10).map(|i| square_at(((i * 7) % 10) as f64 * 20.0, 0.0, 10.0)).collect();
        let mut order = order_nearest_neighbor(&regions);
        assert_eq!(order.len(), regions.len());
        order.sort();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn empty_and_single_region() {
        assert_eq!(order_nearest_neighbor(&[]), Vec::<usize>::new());
        assert_eq!(order_nearest_neighbor(&[square_at(5.0, 5.0, 1.0)]), vec![0]);
    }

    #[test]
    fn document_order_is_identity() {
        let regions = vec![square_at(50.0, 0.0, 1.0), square_at(0.0, 0.0, 1.0)];
        assert_eq!(order_regions(&regions, OrderingStrategy::Document), vec![0, 1]);
        assert_eq!(order_regions(&regions, OrderingStrategy::NearestNeighbor), vec![1, 0]);
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("nearest".parse(), Ok(OrderingStrategy::NearestNeighbor));
        assert_eq!("Document".parse(), Ok(OrderingStrategy::Document));
        assert!("random".parse::<OrderingStrategy>().is_err());
    }
}
