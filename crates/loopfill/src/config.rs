//! Fill and tolerance parameters.
//!
//! All configuration is plain immutable data handed to the pipeline.
//! Validation happens up front so a bad parameter is rejected before any
//! geometry work begins.

use crate::error::{GeometryError, Result};
use crate::order::OrderingStrategy;

/// Hatch line spacing and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSpec {
    /// Distance between neighbouring fill lines, in drawing units
    pub spacing: f64,
    /// Fill line direction in degrees, counter-clockwise from +X, in [0, 180)
    pub angle: f64,
}

impl Default for FillSpec {
    fn default() -> Self {
        Self { spacing: 0.2, angle: 45.0 }
    }
}

impl FillSpec {
    /// Create a validated fill spec.
    pub fn new(spacing: f64, angle: f64) -> Result<Self> {
        let spec = Self { spacing, angle };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(GeometryError::InvalidSpacing(self.spacing));
        }
        if !self.angle.is_finite() || !(0.0..180.0).contains(&self.angle) {
            return Err(GeometryError::InvalidAngleRange(self.angle));
        }
        Ok(())
    }
}

/// Gap tolerances used when assembling fragments into loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceSpec {
    /// Largest start-to-end gap still treated as "already closed"
    pub closure_tolerance: f64,
    /// Largest gap between two fragment endpoints that gets joined
    pub merge_tolerance: f64,
}

impl Default for ToleranceSpec {
    fn default() -> Self {
        Self { closure_tolerance: 0.01, merge_tolerance: 0.01 }
    }
}

impl ToleranceSpec {
    pub fn new(closure_tolerance: f64, merge_tolerance: f64) -> Result<Self> {
        let spec = Self { closure_tolerance, merge_tolerance };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("closure tolerance", self.closure_tolerance)?;
        non_negative("merge tolerance", self.merge_tolerance)
    }
}

/// Everything one fill request needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub fill: FillSpec,
    pub tolerance: ToleranceSpec,
    /// Max chord-to-curve deviation when flattening arcs and splines
    pub chordal_tolerance: f64,
    /// Order in which regions are filled
    pub ordering: OrderingStrategy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fill: FillSpec::default(),
            tolerance: ToleranceSpec::default(),
            chordal_tolerance: 0.01,
            ordering: OrderingStrategy::NearestNeighbor,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.fill.validate()?;
        self.tolerance.validate()?;
        validate_chordal_tolerance(self.chordal_tolerance)
    }
}

/// Chordal tolerance must be strictly positive, or flattening never ends.
pub(crate) fn validate_chordal_tolerance(value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GeometryError::InvalidTolerance {
            name: "chordal tolerance",
            value,
            reason: "must be a positive finite number",
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GeometryError::InvalidTolerance {
            name,
            value,
            reason: "must be a non-negative finite number",
        });
    }
    Ok(())
}
