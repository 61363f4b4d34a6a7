//! Annulus command - fill a ring between two concentric circles.
//!
//! Handy for washers and gaskets, and for checking a machine's hatch
//! settings without drawing anything first.

use anyhow::{Result, bail};
use clap::Args;

use loopfill::{LoopSource, Point};

use super::common::FillOptions;
use super::fill::{fill_sources, finish};

#[derive(Debug, Args)]
pub struct AnnulusArgs {
    /// Outer radius
    #[arg(long)]
    pub outer: f64,

    /// Inner radius (the hole)
    #[arg(long)]
    pub inner: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center_x: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center_y: f64,

    #[command(flatten)]
    pub options: FillOptions,
}

/// The two circles bounding the ring, outer first.
pub fn annulus_sources(args: &AnnulusArgs) -> Result<Vec<LoopSource>> {
    if !(args.inner.is_finite() && args.outer.is_finite()) || args.inner <= 0.0 {
        bail!("radii must be positive numbers (got inner {}, outer {})", args.inner, args.outer);
    }
    if args.inner >= args.outer {
        bail!("inner radius {} must be smaller than outer radius {}", args.inner, args.outer);
    }

    let center = Point::new(args.center_x, args.center_y);
    Ok(vec![
        LoopSource::Circle { center, radius: args.outer },
        LoopSource::Circle { center, radius: args.inner },
    ])
}

pub fn cmd_annulus(args: &AnnulusArgs) -> Result<()> {
    let sources = annulus_sources(args)?;
    let job = args.options.job()?;
    let result = fill_sources(&sources, &job)?;
    finish(&result, &job, &args.options, 0)
}
