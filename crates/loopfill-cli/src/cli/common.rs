//! Common utilities shared across CLI commands.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use loopfill::{Diagnostics, FillResult, Issue, Line, Loop, Point, SourceSet, read_loop_sources, write_drawing};

use super::job::JobConfig;

/// Output format for the fill result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// DXF drawing for the laser controller
    #[default]
    Dxf,
    /// SVG for a quick look in a browser
    Svg,
    /// JSON with every line and issue
    Json,
}

/// Fill and output flags shared by `fill` and `annulus`.
#[derive(Debug, Args)]
pub struct FillOptions {
    /// Output file ("-" or absent for stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Distance between fill lines
    #[arg(short, long)]
    pub spacing: Option<f64>,

    /// Fill line angle in degrees
    #[arg(short, long, allow_negative_numbers = true)]
    pub angle: Option<f64>,

    /// Max gap between a loop's first and last vertex
    #[arg(long)]
    pub closure_tolerance: Option<f64>,

    /// Max gap between endpoints joined into one chain
    #[arg(long)]
    pub merge_tolerance: Option<f64>,

    /// Max deviation of flattened curves from the true curve
    #[arg(long)]
    pub chordal_tolerance: Option<f64>,

    /// Region order: document or nearest
    #[arg(long)]
    pub order: Option<String>,

    /// Output DXF version: r12, r2000 or r2010
    #[arg(long)]
    pub dxf_version: Option<String>,

    /// Leave region boundaries out of the output
    #[arg(long)]
    pub no_boundaries: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Dxf)]
    pub format: OutputFormat,

    /// YAML job file; flags override its values
    #[arg(long)]
    pub config: Option<String>,

    /// Also render a PNG preview to this path
    #[arg(long)]
    pub preview: Option<String>,
}

impl FillOptions {
    /// Job settings from the job file (if any) with flags layered on top.
    pub fn job(&self) -> Result<JobConfig> {
        let file = match &self.config {
            Some(path) => JobConfig::load(path)?,
            None => JobConfig::default(),
        };
        let flags = JobConfig {
            spacing: self.spacing,
            angle: self.angle,
            closure_tolerance: self.closure_tolerance,
            merge_tolerance: self.merge_tolerance,
            chordal_tolerance: self.chordal_tolerance,
            order: self.order.clone(),
            dxf_version: self.dxf_version.clone(),
            boundaries: self.no_boundaries.then_some(false),
            boundary_layer: None,
            fill_layer: None,
        };
        Ok(flags.merge_with(&file))
    }
}

/// Read loop sources from a DXF file, or stdin for "-".
pub fn read_sources(input: &str) -> Result<SourceSet> {
    let set = if input == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).context("failed to read stdin")?;
        read_loop_sources(&mut buffer.as_slice())?
    } else {
        let file = File::open(input).with_context(|| format!("failed to open {}", input))?;
        read_loop_sources(&mut BufReader::new(file)).with_context(|| format!("failed to read {}", input))?
    };
    Ok(set)
}

/// Rewrite source indices in `diagnostics` as drawing entity indices, so
/// messages point at entities the user can find in their CAD program.
pub fn map_to_entities(diagnostics: &mut Diagnostics, set: &SourceSet) {
    let map = |i: &mut usize| *i = set.entity_index(*i).unwrap_or(*i);
    for issue in &mut diagnostics.issues {
        match issue {
            Issue::EntitySkipped { entity, .. } => map(entity),
            Issue::LoopDiscarded { fragments, .. } | Issue::OpenChain { fragments } => fragments.iter_mut().for_each(map),
            _ => {}
        }
    }
}

/// Open the output target: a file, or stdout for "-" / no path.
pub fn open_output(output: Option<&str>) -> Result<Box<dyn Write>> {
    match output {
        None | Some("-") => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}

/// Write a fill result in the chosen format.
pub fn write_result(
    result: &FillResult,
    job: &JobConfig,
    format: OutputFormat,
    skipped: usize,
    output: Option<&str>,
) -> Result<()> {
    let mut out = open_output(output)?;
    let include_boundaries = job.boundaries.unwrap_or(true);
    match format {
        OutputFormat::Dxf => write_drawing(result, &job.drawing_options()?, &mut out)?,
        OutputFormat::Svg => out.write_all(result_to_svg(result, include_boundaries).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &JsonFill::new(result, skipped))?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if let Some(path) = output.filter(|p| *p != "-") {
        log::info!("wrote {}", Path::new(path).display());
    }
    Ok(())
}

// ============================================================================
// SVG
// ============================================================================

/// Render a fill result as SVG.
///
/// Drawing coordinates are y-up; the group transform flips them so the
/// picture is not upside down.
pub fn result_to_svg(result: &FillResult, include_boundaries: bool) -> String {
    let (min_x, min_y, max_x, max_y) = result_bounds(result);
    let margin = ((max_x - min_x).max(max_y - min_y) * 0.02).max(1.0);
    let stroke = ((max_x - min_x).max(max_y - min_y) / 1000.0).max(0.01);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.3} {:.3} {:.3} {:.3}">
<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="white"/>
<g transform="scale(1,-1)" fill="none" stroke-width="{:.3}">
"#,
        min_x - margin,
        -max_y - margin,
        max_x - min_x + 2.0 * margin,
        max_y - min_y + 2.0 * margin,
        min_x - margin,
        -max_y - margin,
        max_x - min_x + 2.0 * margin,
        max_y - min_y + 2.0 * margin,
        stroke,
    ));

    if include_boundaries {
        svg.push_str("<g id=\"boundary\" stroke=\"red\">\n");
        for boundary in result.boundaries() {
            svg.push_str(&format!("  <polygon points=\"{}\"/>\n", points_attr(boundary.vertices())));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("<g id=\"hatch\" stroke=\"black\">\n");
    for line in &result.fill_segments {
        svg.push_str(&format!(
            "  <line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\"/>\n",
            line.x1, line.y1, line.x2, line.y2
        ));
    }
    svg.push_str("</g>\n</g>\n</svg>\n");
    svg
}

fn points_attr(points: &[Point]) -> String {
    points.iter().map(|p| format!("{:.3},{:.3}", p.x, p.y)).collect::<Vec<_>>().join(" ")
}

/// Bounding box of every region, or a unit box if there are none.
fn result_bounds(result: &FillResult) -> (f64, f64, f64, f64) {
    result
        .regions
        .iter()
        .map(|r| r.bounding_box())
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
        .unwrap_or((0.0, 0.0, 1.0, 1.0))
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Serialize)]
pub struct JsonPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for JsonPoint {
    fn from(p: Point) -> Self {
        JsonPoint { x: p.x, y: p.y }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl From<&Line> for JsonLine {
    fn from(line: &Line) -> Self {
        JsonLine { x1: line.x1, y1: line.y1, x2: line.x2, y2: line.y2 }
    }
}

pub fn json_ring(l: &Loop) -> Vec<JsonPoint> {
    l.vertices().iter().copied().map(JsonPoint::from).collect()
}

#[derive(Debug, Serialize)]
pub struct JsonRegion {
    pub outer: Vec<JsonPoint>,
    pub holes: Vec<Vec<JsonPoint>>,
    pub area: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonIssue {
    pub category: &'static str,
    pub message: String,
}

impl From<&Issue> for JsonIssue {
    fn from(issue: &Issue) -> Self {
        JsonIssue { category: issue.category(), message: issue.to_string() }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonStats {
    pub regions: usize,
    pub fill_lines: usize,
    pub fill_length: f64,
    /// Travel between regions, centroid to centroid
    pub travel: f64,
    pub open_chains: usize,
    /// Entities the reader could not use at all
    pub unreadable_entities: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonFill {
    pub regions: Vec<JsonRegion>,
    pub fill: Vec<JsonLine>,
    pub issues: Vec<JsonIssue>,
    pub stats: JsonStats,
}

impl JsonFill {
    pub fn new(result: &FillResult, unreadable_entities: usize) -> Self {
        JsonFill {
            regions: result
                .regions
                .iter()
                .map(|r| JsonRegion { outer: json_ring(&r.outer), holes: r.holes.iter().map(json_ring).collect(), area: r.area() })
                .collect(),
            fill: result.fill_segments.iter().map(JsonLine::from).collect(),
            issues: result.diagnostics.iter().map(JsonIssue::from).collect(),
            stats: JsonStats {
                regions: result.regions.len(),
                fill_lines: result.fill_segments.len(),
                fill_length: result.fill_length(),
                travel: result.travel,
                open_chains: result.open_chains.len(),
                unreadable_entities,
            },
        }
    }
}
