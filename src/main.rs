//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `headscan` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Exit-code handling
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use headscan::{init_logger, run_scan, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    init_logger(config.log_level.into()).context("Failed to initialize logger")?;

    match run_scan(config).await {
        Ok(report) => {
            // Summary goes to the log, never stdout; stdout carries only
            // result lines and bad-line reports.
            log::info!(
                "Probed {} target{} ({} emitted, {} bad line{}) in {:.1}s",
                report.targets,
                if report.targets == 1 { "" } else { "s" },
                report.emitted,
                report.bad_lines,
                if report.bad_lines == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("headscan error: {:#}", e);
            process::exit(1);
        }
    }
}
