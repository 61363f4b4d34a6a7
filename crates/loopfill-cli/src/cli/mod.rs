//! CLI command implementations.
//!
//! - `fill` - hatch every closed region of a DXF drawing
//! - `annulus` - hatch a ring between two circles, no drawing needed
//! - `inspect` - report loops, holes and problems without filling

pub mod annulus;
pub mod common;
pub mod fill;
pub mod inspect;
pub mod job;
pub mod preview;

pub use annulus::{AnnulusArgs, cmd_annulus};
pub use fill::{FillArgs, cmd_fill};
pub use inspect::{InspectArgs, cmd_inspect};
