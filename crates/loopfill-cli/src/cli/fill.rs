//! Fill command - hatch every closed region of a DXF drawing.

use anyhow::Result;
use clap::Args;

use loopfill::{FillResult, LoopSource, run};

use super::common::{FillOptions, map_to_entities, read_sources, write_result};
use super::job::JobConfig;
use super::preview::save_preview;

#[derive(Debug, Args)]
pub struct FillArgs {
    /// Input DXF file ("-" for stdin)
    pub input: String,

    #[command(flatten)]
    pub options: FillOptions,
}

pub fn cmd_fill(args: &FillArgs) -> Result<()> {
    let job = args.options.job()?;
    let set = read_sources(&args.input)?;
    log::info!("read {} loop source(s) from {}", set.sources.len(), args.input);
    if !set.skipped.is_empty() {
        log::warn!("{} entity(ies) could not be read and were ignored", set.skipped.len());
    }

    let mut result = fill_sources(&set.sources, &job)?;
    map_to_entities(&mut result.diagnostics, &set);
    for chain in &mut result.open_chains {
        chain.fragments.iter_mut().for_each(|i| *i = set.entity_index(*i).unwrap_or(*i));
    }
    finish(&result, &job, &args.options, set.skipped.len())
}

/// Run the pipeline with the settings from `job`.
pub fn fill_sources(sources: &[LoopSource], job: &JobConfig) -> Result<FillResult> {
    let config = job.pipeline_config()?;
    log::debug!("pipeline settings: {:?}", config);
    Ok(run(sources, &config)?)
}

/// Report issues, then write the output and optional preview.
pub fn finish(result: &FillResult, job: &JobConfig, options: &FillOptions, unreadable: usize) -> Result<()> {
    for issue in result.diagnostics.iter() {
        log::info!("{}", issue);
    }

    write_result(result, job, options.format, unreadable, options.output.as_deref())?;

    if let Some(png) = &options.preview {
        save_preview(result, job.boundaries.unwrap_or(true), png)?;
    }

    log::info!(
        "{} region(s), {} fill line(s), {:.1} units of fill",
        result.regions.len(),
        result.fill_segments.len(),
        result.fill_length()
    );
    Ok(())
}
