mod cli;
mod logging;
mod term_progress;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use dotenv::dotenv;
use fileledger::{report, CatalogEngine, RunConfig, RunOutcome};
use term_progress::TermReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    if let Err(err) = run(args) {
        error!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let app_config =
        fileledger::config::load_configuration().context("error loading configuration")?;

    let algorithm = args
        .algorithm
        .or(app_config.algorithm)
        .unwrap_or_default();
    let threshold = args.resolved_threshold(app_config.archive_member_limit);
    let output_dir = args
        .output
        .clone()
        .or_else(|| app_config.output_dir.as_deref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let config = RunConfig::new(args.inputs)
        .with_algorithm(algorithm)
        .with_threshold(threshold);

    let engine = CatalogEngine::new(config);
    let reporter = Arc::new(TermReporter::new());
    let handle = engine.start(reporter.clone())?;

    let cancel = handle.cancel_token();
    ctrlc::set_handler(move || cancel.cancel())
        .context("error installing Ctrl+C handler")?;

    match handle.wait() {
        RunOutcome::Completed(results) => {
            reporter.finish();
            let manifest_path = report::write_manifest(&output_dir, algorithm, &results)
                .context("error writing manifest")?;
            info!(
                "{} entries cataloged, {} errors, {} duplicate groups",
                results.catalog.len().to_string().green(),
                results.errors.len().to_string().red(),
                results.duplicate_groups.len().to_string().yellow(),
            );
            println!("Manifest written to {}", manifest_path.display());
        }
        RunOutcome::Cancelled => {
            reporter.finish();
            println!("{}", "Catalog run cancelled; no manifest was written.".yellow());
        }
    }

    Ok(())
}
