//! Inspect command - show how a drawing's entities become loops and regions.
//!
//! Nothing is filled. This is the first thing to run when a fill comes out
//! wrong: it shows which entities were ignored, which chains never closed,
//! and which loops were taken as holes.

use std::fmt::Write as _;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use loopfill::{Reconstruction, SourceSet, reconstruct};

use super::common::{JsonIssue, JsonPoint, map_to_entities, read_sources};
use super::job::JobConfig;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Input DXF file ("-" for stdin)
    pub input: String,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub closure_tolerance: Option<f64>,

    #[arg(long)]
    pub merge_tolerance: Option<f64>,

    #[arg(long)]
    pub chordal_tolerance: Option<f64>,

    /// YAML job file; only its tolerances are used
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SkippedReport {
    pub entity: usize,
    pub kind: String,
    pub reason: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoopReport {
    pub index: usize,
    /// "outer", "hole", or "rejected" for loops the region builder dropped
    pub role: &'static str,
    pub depth: Option<usize>,
    pub parent: Option<usize>,
    pub area: f64,
    pub vertices: usize,
    pub entities: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct ChainReport {
    pub entities: Vec<usize>,
    pub start: JsonPoint,
    pub end: JsonPoint,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub sources: usize,
    pub skipped: Vec<SkippedReport>,
    pub loops: Vec<LoopReport>,
    pub regions: usize,
    pub open_chains: Vec<ChainReport>,
    pub issues: Vec<JsonIssue>,
}

impl InspectReport {
    pub fn new(set: &SourceSet, reconstruction: &Reconstruction) -> Self {
        let to_entities =
            |indices: &[usize]| -> Vec<usize> { indices.iter().map(|&i| set.entity_index(i).unwrap_or(i)).collect() };

        let loops = reconstruction
            .loops
            .iter()
            .enumerate()
            .map(|(index, l)| {
                let nesting = reconstruction.region_set.nesting_of(index);
                LoopReport {
                    index,
                    role: nesting.map_or("rejected", |n| n.role.name()),
                    depth: nesting.map(|n| n.depth),
                    parent: nesting.and_then(|n| n.parent),
                    area: l.area(),
                    vertices: l.vertices().len(),
                    entities: to_entities(&l.sources),
                }
            })
            .collect();

        let open_chains = reconstruction
            .open_chains
            .iter()
            .filter_map(|chain| {
                let (first, last) = (chain.points.first()?, chain.points.last()?);
                Some(ChainReport { entities: to_entities(&chain.fragments), start: (*first).into(), end: (*last).into() })
            })
            .collect();

        let mut diagnostics = reconstruction.diagnostics.clone();
        map_to_entities(&mut diagnostics, set);

        InspectReport {
            sources: set.sources.len(),
            skipped: set
                .skipped
                .iter()
                .map(|s| SkippedReport { entity: s.index, kind: s.kind.clone(), reason: s.reason })
                .collect(),
            loops,
            regions: reconstruction.region_set.regions.len(),
            open_chains,
            issues: diagnostics.iter().map(JsonIssue::from).collect(),
        }
    }

    /// Human readable report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // fmt::Write into a String cannot fail
        let _ = writeln!(out, "{} loop source(s), {} entity(ies) ignored", self.sources, self.skipped.len());
        for s in &self.skipped {
            let _ = writeln!(out, "  entity #{} ({}): {}", s.entity, s.kind, s.reason);
        }

        let _ = writeln!(out, "\n{} loop(s), {} region(s)", self.loops.len(), self.regions);
        for l in &self.loops {
            let parent = l.parent.map_or("-".to_string(), |p| format!("loop {}", p));
            let _ = writeln!(
                out,
                "  loop {:<3} {:<8} depth {}  parent {:<8} area {:>12.3}  {} vertices  entities {:?}",
                l.index,
                l.role,
                l.depth.map_or("-".to_string(), |d| d.to_string()),
                parent,
                l.area,
                l.vertices,
                l.entities
            );
        }

        if !self.open_chains.is_empty() {
            let _ = writeln!(out, "\n{} open chain(s)", self.open_chains.len());
            for c in &self.open_chains {
                let _ = writeln!(
                    out,
                    "  ({:.3}, {:.3}) .. ({:.3}, {:.3})  entities {:?}",
                    c.start.x, c.start.y, c.end.x, c.end.y, c.entities
                );
            }
        }

        if !self.issues.is_empty() {
            let _ = writeln!(out, "\n{} issue(s)", self.issues.len());
            for issue in &self.issues {
                let _ = writeln!(out, "  [{}] {}", issue.category, issue.message);
            }
        }
        out
    }
}

pub fn cmd_inspect(args: &InspectArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::default(),
    };
    let flags = JobConfig {
        closure_tolerance: args.closure_tolerance,
        merge_tolerance: args.merge_tolerance,
        chordal_tolerance: args.chordal_tolerance,
        ..Default::default()
    };
    let config = flags.merge_with(&file).pipeline_config()?;

    let set = read_sources(&args.input)?;
    let reconstruction = reconstruct(&set.sources, &config)?;
    let report = InspectReport::new(&set, &reconstruction);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
