//! `hoststats` CLI - server metrics aggregation from the command line
//!
//! Provides commands for collecting unified statistics from the local host
//! and configured Webdock VPS instances, and for checking Webdock API
//! connectivity and rate-limit standing.

mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::Cli;
use hoststats_core::tracing::{TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        TracingLevel::Error
    } else {
        match cli.verbose {
            0 => TracingLevel::Warn,
            1 => TracingLevel::Info,
            2 => TracingLevel::Debug,
            _ => TracingLevel::Trace,
        }
    };
    if let Err(e) = init_tracing(level) {
        eprintln!("Warning: {e}");
    }

    let result = commands::dispatch(cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
