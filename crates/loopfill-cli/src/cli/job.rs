//! Job files - fill settings stored as YAML.
//!
//! A job file holds the settings a shop reuses for one machine or material.
//! Every field is optional; flags given on the command line win over the
//! file, and the library defaults fill whatever is left.
//!
//! ```yaml
//! spacing: 0.2
//! angle: 45
//! merge_tolerance: 0.02
//! order: nearest
//! dxf_version: r12
//! boundaries: true
//! fill_layer: HATCH
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use loopfill::{DrawingOptions, FillSpec, OrderingStrategy, PipelineConfig, TargetVersion, ToleranceSpec};

/// Fill settings, each one optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default)]
    pub spacing: Option<f64>,
    /// Fill line angle in degrees; any value, folded into [0, 180)
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub closure_tolerance: Option<f64>,
    #[serde(default)]
    pub merge_tolerance: Option<f64>,
    #[serde(default)]
    pub chordal_tolerance: Option<f64>,
    /// "document" or "nearest"
    #[serde(default)]
    pub order: Option<String>,
    /// "r12", "r2000" or "r2010"
    #[serde(default)]
    pub dxf_version: Option<String>,
    /// Re-draw region boundaries in the output
    #[serde(default)]
    pub boundaries: Option<bool>,
    #[serde(default)]
    pub boundary_layer: Option<String>,
    #[serde(default)]
    pub fill_layer: Option<String>,
}

impl JobConfig {
    /// Load a job from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read job file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse job file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Layer `self` over `base`, preferring self's values.
    pub fn merge_with(&self, base: &JobConfig) -> JobConfig {
        JobConfig {
            spacing: self.spacing.or(base.spacing),
            angle: self.angle.or(base.angle),
            closure_tolerance: self.closure_tolerance.or(base.closure_tolerance),
            merge_tolerance: self.merge_tolerance.or(base.merge_tolerance),
            chordal_tolerance: self.chordal_tolerance.or(base.chordal_tolerance),
            order: self.order.clone().or_else(|| base.order.clone()),
            dxf_version: self.dxf_version.clone().or_else(|| base.dxf_version.clone()),
            boundaries: self.boundaries.or(base.boundaries),
            boundary_layer: self.boundary_layer.clone().or_else(|| base.boundary_layer.clone()),
            fill_layer: self.fill_layer.clone().or_else(|| base.fill_layer.clone()),
        }
    }

    /// Pipeline settings, with library defaults for anything unset.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let ordering = match &self.order {
            Some(name) => name.parse::<OrderingStrategy>().map_err(|e| anyhow!(e))?,
            None => defaults.ordering,
        };

        let config = PipelineConfig {
            fill: FillSpec {
                spacing: self.spacing.unwrap_or(defaults.fill.spacing),
                angle: normalize_angle(self.angle.unwrap_or(defaults.fill.angle)),
            },
            tolerance: ToleranceSpec {
                closure_tolerance: self.closure_tolerance.unwrap_or(defaults.tolerance.closure_tolerance),
                merge_tolerance: self.merge_tolerance.unwrap_or(defaults.tolerance.merge_tolerance),
            },
            chordal_tolerance: self.chordal_tolerance.unwrap_or(defaults.chordal_tolerance),
            ordering,
        };
        config.validate()?;
        Ok(config)
    }

    /// Output drawing settings, with defaults for anything unset.
    pub fn drawing_options(&self) -> Result<DrawingOptions> {
        let defaults = DrawingOptions::default();

        let version = match &self.dxf_version {
            Some(name) => TargetVersion::from_name(name)
                .ok_or_else(|| anyhow!("unknown DXF version '{}', use r12, r2000 or r2010", name))?,
            None => defaults.version,
        };

        Ok(DrawingOptions {
            version,
            include_boundaries: self.boundaries.unwrap_or(defaults.include_boundaries),
            boundary_layer: self.boundary_layer.clone().unwrap_or(defaults.boundary_layer),
            fill_layer: self.fill_layer.clone().unwrap_or(defaults.fill_layer),
        })
    }
}

/// Fold any angle into [0, 180). A line at 225° is the same line as at 45°.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return degrees;
    }
    let folded = degrees.rem_euclid(180.0);
    // rem_euclid can round up to exactly 180 for tiny negative inputs
    if folded >= 180.0 { 0.0 } else { folded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_job_gives_defaults() {
        let job = JobConfig::parse("{}").unwrap();
        assert_eq!(job.pipeline_config().unwrap(), PipelineConfig::default());
        assert_eq!(job.drawing_options().unwrap(), DrawingOptions::default());
    }

    #[test]
    fn parses_a_full_job() {
        let job = JobConfig::parse(
            "spacing: 0.5\nangle: 30\norder: document\ndxf_version: r2010\nboundaries: false\nfill_layer: FILL\n",
        )
        .unwrap();

        let config = job.pipeline_config().unwrap();
        assert_eq!(config.fill.spacing, 0.5);
        assert_eq!(config.fill.angle, 30.0);
        assert_eq!(config.ordering, OrderingStrategy::Document);

        let options = job.drawing_options().unwrap();
        assert_eq!(options.version, TargetVersion::R2010);
        assert!(!options.include_boundaries);
        assert_eq!(options.fill_layer, "FILL");
        assert_eq!(options.boundary_layer, "BOUNDARY");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(JobConfig::parse("spacingg: 1.0\n").is_err());
    }

    #[test]
    fn flags_override_file() {
        let file = JobConfig { spacing: Some(1.0), angle: Some(10.0), ..Default::default() };
        let flags = JobConfig { spacing: Some(0.3), ..Default::default() };
        let merged = flags.merge_with(&file);
        assert_eq!(merged.spacing, Some(0.3));
        assert_eq!(merged.angle, Some(10.0));
    }

    #[test]
    fn bad_values_are_reported() {
        let job = JobConfig { spacing: Some(0.0), ..Default::default() };
        assert!(job.pipeline_config().is_err());

        let job = JobConfig { order: Some("random".to_string()), ..Default::default() };
        assert!(job.pipeline_config().is_err());

        let job = JobConfig { dxf_version: Some("r14".to_string()), ..Default::default() };
        assert!(job.drawing_options().is_err());
    }

    #[test]
    fn angles_fold_into_half_turn() {
        assert_eq!(normalize_angle(45.0), 45.0);
        assert_eq!(normalize_angle(225.0), 45.0);
        assert_eq!(normalize_angle(-45.0), 135.0);
        assert_eq!(normalize_angle(180.0), 0.0);
    }
}
