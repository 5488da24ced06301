//! map-deps: list every file a MapServer mapfile depends on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mapdeps_core::{TextReport, WalkOptions, inspect, render_json};

mod setup;

use setup::LibraryConfig;

#[derive(Parser, Debug)]
#[command(name = "map-deps")]
#[command(version)]
#[command(about = "List the files a MapServer mapfile depends on", long_about = None)]
struct Args {
    /// Mapfile to inspect
    #[arg(value_name = "MAPFILE")]
    mapfile: PathBuf,

    /// Print each reference as it is resolved
    #[arg(short, long)]
    debug: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Projection library directory (overrides PROJ_LIB)
    #[arg(long, value_name = "DIR")]
    proj_lib: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() {
    let args = Args::parse();
    let config = LibraryConfig::from_env().with_proj_lib(args.proj_lib.clone());

    if let Err(e) = setup::init_logging(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if !args.mapfile.exists() {
        eprintln!("Mapfile: {:?} doesn't exist!", args.mapfile);
        std::process::exit(1);
    }

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &LibraryConfig) -> Result<()> {
    setup::report_library(config);

    let text = args.format == ReportFormat::Text;
    if text {
        println!("Found mapfile reader:");
        println!("{}", mapdeps_mapfile::version());
        println!("Trying mapfile {:?}", args.mapfile);
    }

    let map = mapdeps_mapfile::load_map(&args.mapfile)
        .with_context(|| format!("Failed to load mapfile {}", args.mapfile.display()))?;

    let options = WalkOptions {
        fallback_root: config.fallback_root.clone(),
        debug: args.debug,
    };
    let inspection = inspect(&map, options)
        .with_context(|| format!("Failed to inspect mapfile {}", args.mapfile.display()))?;

    if inspection.needs_review() {
        tracing::info!(
            warnings = inspection.review.warnings().len(),
            "Mapfile requires manual review"
        );
    }

    match args.format {
        ReportFormat::Text => print!("{}", TextReport(&inspection)),
        ReportFormat::Json => println!("{}", render_json(&inspection)?),
    }
    Ok(())
}
