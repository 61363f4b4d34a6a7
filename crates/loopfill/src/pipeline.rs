//! The full fill pipeline: flatten, assemble, build regions, order, hatch.
//!
//! One request is one synchronous call over immutable inputs. Bad entities
//! and bad loops are recorded in the diagnostics and skipped; only "nothing
//! left to fill" is an error.

use crate::assemble::{Chain, assemble};
use crate::config::PipelineConfig;
use crate::diagnostics::{Diagnostics, Issue};
use crate::error::Result;
use crate::flatten::{LoopSource, flatten};
use crate::geometry::{Fragment, Line, Loop, Region};
use crate::hatch::generate_fill_all;
use crate::order::{calculate_travel_distance, order_regions};
use crate::regions::{RegionSet, build_regions};

/// Loops and regions recovered from a set of sources, before any fill.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Number of sources that flattened successfully
    pub fragments: usize,
    /// Closed loops; `sources` holds entity indices
    pub loops: Vec<Loop>,
    /// Regions in drawing order, with per-loop nesting
    pub region_set: RegionSet,
    /// Chains that never closed; `fragments` holds entity indices
    pub open_chains: Vec<Chain>,
    /// Everything skipped or suspicious along the way
    pub diagnostics: Diagnostics,
}

/// Output of [`run`].
#[derive(Debug, Clone)]
pub struct FillResult {
    /// Regions in fill order
    pub regions: Vec<Region>,
    /// Fill lines, region by region in fill order
    pub fill_segments: Vec<Line>,
    /// Centroid-to-centroid travel between regions in fill order
    pub travel: f64,
    pub open_chains: Vec<Chain>,
    pub diagnostics: Diagnostics,
}

/// What a drawing item is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRole {
    Boundary,
    Fill,
}

/// One thing to put in an output drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawingItem<'a> {
    Boundary(&'a Loop),
    Fill(Line),
}

impl DrawingItem<'_> {
    pub fn role(&self) -> ItemRole {
        match self {
            DrawingItem::Boundary(_) => ItemRole::Boundary,
            DrawingItem::Fill(_) => ItemRole::Fill,
        }
    }
}

impl FillResult {
    /// Every boundary loop (outers and holes) followed by every fill line.
    pub fn items(&self) -> impl Iterator<Item = DrawingItem<'_>> {
        self.boundaries()
            .map(DrawingItem::Boundary)
            .chain(self.fill_segments.iter().copied().map(DrawingItem::Fill))
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &Loop> {
        self.regions.iter().flat_map(Region::loops)
    }

    /// Total length of all fill lines, i.e. how far the beam travels while on.
    pub fn fill_length(&self) -> f64 {
        self.fill_segments.iter().map(Line::length).sum()
    }
}

/// Flatten and assemble `sources`, then nest the loops into regions.
///
/// Fails on invalid parameters, or with `EmptyRegionSet` if no region
/// survives.
pub fn reconstruct(sources: &[LoopSource], config: &PipelineConfig) -> Result<Reconstruction> {
    config.validate()?;

    let mut diagnostics = Diagnostics::new();
    let mut fragments: Vec<Fragment> = Vec::with_capacity(sources.len());
    // fragment index -> source index
    let mut origin: Vec<usize> = Vec::with_capacity(sources.len());

    for (i, source) in sources.iter().enumerate() {
        match flatten(source, config.chordal_tolerance) {
            Ok(fragment) => {
                fragments.push(fragment);
                origin.push(i);
            }
            Err(error) => {
                log::warn!("skipping entity #{} ({}): {}", i, source.kind(), error);
                diagnostics.push(Issue::EntitySkipped { entity: i, kind: source.kind().to_string(), error });
            }
        }
    }
    log::debug!("flattened {} of {} source(s)", fragments.len(), sources.len());

    let mut assembly = assemble(&fragments, &config.tolerance);
    let to_entities = |indices: &mut Vec<usize>| indices.iter_mut().for_each(|i| *i = origin[*i]);
    for l in &mut assembly.loops {
        to_entities(&mut l.sources);
    }
    for chain in &mut assembly.open_chains {
        to_entities(&mut chain.fragments);
    }
    for issue in &mut assembly.diagnostics.issues {
        if let Issue::LoopDiscarded { fragments, .. } | Issue::OpenChain { fragments } = issue {
            to_entities(fragments);
        }
    }
    diagnostics.extend(assembly.diagnostics);

    let mut region_set = build_regions(&assembly.loops)?;
    diagnostics.extend(std::mem::take(&mut region_set.diagnostics));

    Ok(Reconstruction {
        fragments: fragments.len(),
        loops: assembly.loops,
        region_set,
        open_chains: assembly.open_chains,
        diagnostics,
    })
}

/// Run the whole pipeline on one batch of sources.
///
/// Parameters are validated before any geometry work.
pub fn run(sources: &[LoopSource], config: &PipelineConfig) -> Result<FillResult> {
    let reconstruction = reconstruct(sources, config)?;

    let regions = reconstruction.region_set.regions;
    let order = order_regions(&regions, config.ordering);
    let travel = calculate_travel_distance(&regions, &order);
    let mut slots: Vec<Option<Region>> = regions.into_iter().map(Some).collect();
    let regions: Vec<Region> = order.iter().filter_map(|&i| slots[i].take()).collect();

    let fill_segments = generate_fill_all(&regions, &config.fill)?;

    log::info!(
        "{} region(s), {} fill line(s), {:.3} travel, {} issue(s)",
        regions.len(),
        fill_segments.len(),
        travel,
        reconstruction.diagnostics.len()
    );

    Ok(FillResult {
        regions,
        fill_segments,
        travel,
        open_chains: reconstruction.open_chains,
        diagnostics: reconstruction.diagnostics,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FillSpec;
    use crate::error::GeometryError;
    use crate::geometry::Point;
    use crate::order::OrderingStrategy;

    fn circle(r: f64) -> LoopSource {
        LoopSource::Circle { center: Point::new(0.0, 0.0), radius: r }
    }

    /// Rounded rectangle made of four lines and four quarter arcs.
    fn rounded_rect() -> Vec<LoopSource> {
        let arc = |cx: f64, cy: f64, start: f64| LoopSource::Arc {
            center: Point::new(cx, cy),
            radius: 2.0,
            start_angle: start,
            end_angle: start + 90.0,
        };
        vec![
            LoopSource::line(Point::new(2.0, 0.0), Point::new(18.0, 0.0)),
            arc(18.0, 2.0, 270.0),
            LoopSource::line(Point::new(20.0, 2.0), Point::new(20.0, 8.0)),
            arc(18.0, 8.0, 0.0),
            LoopSource::line(Point::new(18.0, 10.0), Point::new(2.0, 10.0)),
            arc(2.0, 8.0, 90.0),
            LoopSource::line(Point::new(0.0, 8.0), Point::new(0.0, 2.0)),
            arc(2.0, 2.0, 180.0),
        ]
    }

    #[test]
    fn annulus_fills_only_the_ring() {
        let config = PipelineConfig { fill: FillSpec::new(0.5, 45.0).unwrap(), ..Default::default() };
        let result = run(&[circle(10.0), circle(5.0)], &config).unwrap();

        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].holes.len(), 1);
        assert!(!result.fill_segments.is_empty());
        for line in result.fill_segments.iter().filter(|l| l.length() > 1e-3) {
            let mid = line.midpoint();
            let r = mid.x.hypot(mid.y);
            assert!(r > 4.99 && r < 10.01, "midpoint {:?} at radius {}", mid, r);
        }
        assert!(result.diagnostics.is_empty(), "{}", result.diagnostics);
    }

    #[test]
    fn rounded_rectangle_assembles_from_pieces() {
        let reconstruction = reconstruct(&rounded_rect(), &PipelineConfig::default()).unwrap();

        assert_eq!(reconstruction.loops.len(), 1);
        assert!(reconstruction.open_chains.is_empty());
        let mut sources = reconstruction.loops[0].sources.clone();
        sources.sort();
        assert_eq!(sources, (0..8).collect::<Vec<_>>());

        // 20 x 10 minus the four corner cut-offs (4 - π) r².
        let expected = 200.0 - (4.0 - std::f64::consts::PI) * 4.0;
        assert!((reconstruction.loops[0].area() - expected).abs() < 0.2);
    }

    #[test]
    fn bad_entities_are_skipped_not_fatal() {
        let sources = vec![circle(0.0), circle(10.0), LoopSource::polyline(&[Point::new(1.0, 1.0)], false)];
        let result = run(&sources, &PipelineConfig::default()).unwrap();

        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.diagnostics.skipped_entities(), 2);
        let skipped: Vec<usize> = result
            .diagnostics
            .iter()
            .filter_map(|i| match i {
                Issue::EntitySkipped { entity, .. } => Some(*entity),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![0, 2]);
    }

    #[test]
    fn open_chain_reports_entity_indices() {
        let sources = vec![
            circle(0.0),
            circle(10.0),
            LoopSource::line(Point::new(50.0, 0.0), Point::new(60.0, 0.0)),
        ];
        let reconstruction = reconstruct(&sources, &PipelineConfig::default()).unwrap();
        assert_eq!(reconstruction.open_chains.len(), 1);
        assert_eq!(reconstruction.open_chains[0].fragments, vec![2]);
        assert_eq!(reconstruction.loops[0].sources, vec![1]);
    }

    #[test]
    fn nothing_to_fill_is_an_error() {
        let sources = vec![LoopSource::line(Point::new(0.0, 0.0), Point::new(1.0, 0.0))];
        assert_eq!(run(&sources, &PipelineConfig::default()).unwrap_err(), GeometryError::EmptyRegionSet);
        assert_eq!(run(&[], &PipelineConfig::default()).unwrap_err(), GeometryError::EmptyRegionSet);
    }

    #[test]
    fn parameters_are_checked_first() {
        let config = PipelineConfig { fill: FillSpec { spacing: -1.0, angle: 0.0 }, ..Default::default() };
        // No sources at all, but the spacing error wins.
        assert_eq!(run(&[], &config).unwrap_err(), GeometryError::InvalidSpacing(-1.0));
    }

    #[test]
    fn overlapping_hole_keeps_fill_inside_the_outline() {
        let rect = |x0: f64, y0: f64, x1: f64, y1: f64| {
            LoopSource::polyline(
                &[Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1), Point::new(x0, y1)],
                true,
            )
        };
        let config = PipelineConfig {
            fill: FillSpec::new(1.0, 0.0).unwrap(),
            ordering: OrderingStrategy::Document,
            ..Default::default()
        };
        let result = run(&[rect(0.0, 0.0, 10.0, 10.0), rect(7.0, 2.0, 12.0, 8.0)], &config).unwrap();

        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].holes.len(), 1);
        assert_eq!(result.diagnostics.count("partial_overlap"), 1, "{}", result.diagnostics);
        for line in &result.fill_segments {
            assert!(line.x1.max(line.x2) <= 10.0 + 1e-9, "fill line {:?} outside the outline", line);
        }
    }

    #[test]
    fn regions_come_out_in_fill_order() {
        let square = |x: f64| {
            LoopSource::polyline(
                &[Point::new(x, 0.0), Point::new(x + 5.0, 0.0), Point::new(x + 5.0, 5.0), Point::new(x, 5.0)],
                true,
            )
        };
        let sources = vec![square(100.0), square(0.0), square(50.0)];

        let nearest = run(&sources, &PipelineConfig::default()).unwrap();
        let xs: Vec<f64> = nearest.regions.iter().map(|r| r.bounding_box().0).collect();
        assert_eq!(xs, vec![0.0, 50.0, 100.0]);
        assert!((nearest.travel - 100.0).abs() < 1e-9, "travel was {}", nearest.travel);

        let config = PipelineConfig { ordering: OrderingStrategy::Document, ..Default::default() };
        let document = run(&sources, &config).unwrap();
        let xs: Vec<f64> = document.regions.iter().map(|r| r.bounding_box().0).collect();
        assert_eq!(xs, vec![100.0, 0.0, 50.0]);
        assert!((document.travel - 150.0).abs() < 1e-9, "travel was {}", document.travel);
    }

    #[test]
    fn items_are_tagged_by_role() {
        let result = run(&[circle(10.0), circle(5.0)], &PipelineConfig::default()).unwrap();
        let boundaries = result.items().filter(|i| i.role() == ItemRole::Boundary).count();
        let fills = result.items().filter(|i| i.role() == ItemRole::Fill).count();
        assert_eq!(boundaries, 2);
        assert_eq!(fills, result.fill_segments.len());
        assert!(result.fill_length() > 0.0);
    }
}
