//! Error types for loop reconstruction and fill generation.
//!
//! ## Rust Lesson #20: Error Handling
//!
//! Rust uses `Result<T, E>` instead of exceptions. `thiserror` derives the
//! `Display` and `std::error::Error` boilerplate from the `#[error]`
//! attributes, so each variant documents its own message.

use thiserror::Error;

/// Errors raised by the geometry engine.
///
/// Per-entity and per-loop variants are recoverable: the pipeline records
/// them in [`crate::Diagnostics`] and carries on with the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// An input entity could not be flattened.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// A candidate loop had fewer than 3 distinct vertices or no area.
    #[error("degenerate loop: {0}")]
    DegenerateLoop(String),

    /// A loop self-intersects or is otherwise not a simple polygon.
    #[error("invalid loop geometry: {0}")]
    InvalidLoopGeometry(String),

    /// No usable closed loop remained.
    #[error("no usable closed loops to fill")]
    EmptyRegionSet,

    #[error("invalid spacing {0}: must be a positive finite number")]
    InvalidSpacing(f64),

    #[error("invalid angle {0}: must be within [0, 180) degrees")]
    InvalidAngleRange(f64),

    /// The spacing is too fine for the region's size.
    #[error("fill needs {0:e} scanlines; increase the spacing")]
    TooManyScanlines(f64),

    #[error("invalid {name} {value}: {reason}")]
    InvalidTolerance {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
