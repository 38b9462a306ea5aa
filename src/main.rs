//! CLI entry point for geoip2-update.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use geoip2_update::Updater;
use tracing::{debug, info};

mod cli;
mod output;

use cli::Args;
use output::ProgressObserver;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(
        config = ?args.config,
        dir = ?args.dir,
        editions = ?args.editions,
        "CLI arguments parsed"
    );

    let config = args.build_config().context("invalid configuration")?;
    info!(editions = config.editions.len(), "geoip2-update starting");

    let show_progress = !args.no_progress && !args.quiet && io::stderr().is_terminal();
    let updater = Updater::new(config)
        .context("failed to set up the download client")?
        .with_observer(Arc::new(ProgressObserver::new(show_progress)));

    let report = updater.run().await;
    output::print_report(&report, args.quiet);

    info!(
        updated = report.updated_count(),
        failed = report.errors().len(),
        "geoip2-update finished"
    );

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
