//! # loopfill
//!
//! Rebuild closed regions from loose 2D drawing entities and fill them with
//! parallel hatch lines that an old laser or CNC controller can follow.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`flatten`] - circles, arcs, ellipses, polylines and splines become
//!    polylines within a chordal tolerance
//! 2. [`assemble`] - touching fragments are chained into closed loops
//! 3. [`regions`] - loops are nested; even depth is filled, odd depth is a hole
//! 4. [`hatch`] - each region is cut by evenly spaced parallel lines
//!
//! [`pipeline::run`] drives all four, and [`drawing`] reads and writes DXF.
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Unlike Node.js, you must explicitly declare every module.

pub mod assemble;
pub mod clip;
pub mod config;
pub mod diagnostics;
pub mod drawing;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod hatch;
pub mod order;
pub mod pipeline;
pub mod regions;
pub mod spline;

// Re-export common types at crate root for convenience.
pub use assemble::{Assembly, Chain, assemble};
pub use config::{FillSpec, PipelineConfig, ToleranceSpec};
pub use diagnostics::{Diagnostics, Issue};
pub use drawing::{
    DrawingError, DrawingOptions, OutputCapabilities, SourceSet, TargetVersion, build_drawing, load_loop_sources,
    loop_sources_from_drawing, read_loop_sources, save_drawing, write_drawing,
};
pub use error::{GeometryError, Result};
pub use flatten::{LoopSource, PolylineVertex, flatten};
pub use geometry::{Fragment, Line, Loop, Point, Region, Segment, Vertex};
pub use hatch::{generate_fill, generate_fill_all};
pub use order::{OrderingStrategy, calculate_travel_distance, order_regions};
pub use pipeline::{DrawingItem, FillResult, ItemRole, Reconstruction, reconstruct, run};
pub use regions::{LoopNesting, LoopRole, RegionSet, build_regions};
pub use spline::Spline;

// The drawing types in our public API come from here.
pub use dxf;
