//! loopfill - hatch fills for laser and CNC controllers
//!
//! Usage:
//!   loopfill fill <drawing.dxf> -o out.dxf -s 0.2 -a 45
//!   loopfill annulus --outer 20 --inner 8 -o washer.dxf
//!   loopfill inspect <drawing.dxf>
//!
//! Log output goes to stderr. `-v` shows progress, `-vv` shows debug
//! detail; RUST_LOG overrides both.

mod cli;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cli::{AnnulusArgs, FillArgs, InspectArgs, cmd_annulus, cmd_fill, cmd_inspect};

#[derive(Parser)]
#[command(name = "loopfill", version, about = "Closed-region hatch fill for DXF drawings")]
struct Cli {
    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hatch every closed region of a DXF drawing
    Fill(FillArgs),
    /// Hatch the ring between two concentric circles
    Annulus(AnnulusArgs),
    /// Show loops, holes and problems without filling
    Inspect(InspectArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match &cli.command {
        Commands::Fill(args) => cmd_fill(args),
        Commands::Annulus(args) => cmd_annulus(args),
        Commands::Inspect(args) => cmd_inspect(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
