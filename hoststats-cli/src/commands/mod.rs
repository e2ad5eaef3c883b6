//! Command handler modules for the CLI.

mod ping;
mod stats;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Stats {
            local_hosts,
            ttl,
            pretty,
            no_local,
        } => stats::cmd_stats(local_hosts, ttl, pretty, no_local),
        Commands::Ping { token } => ping::cmd_ping(&token),
    }
}
