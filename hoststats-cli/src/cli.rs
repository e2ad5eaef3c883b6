//! CLI argument parsing types using `clap`.

use clap::{Parser, Subcommand};

/// `hoststats` command-line interface for aggregated server metrics
#[derive(Parser)]
#[command(name = "hoststats-cli")]
#[command(author, version, about = "hoststats command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Collect stats for all configured sources
    #[command(about = "Collect stats for the local host and configured Webdock servers")]
    Stats {
        /// Local host name to report under (defaults to the machine's
        /// host name; can be repeated)
        #[arg(short = 'H', long = "local-host")]
        local_hosts: Vec<String>,

        /// Cache time-to-live in seconds
        #[arg(short, long, default_value = "30")]
        ttl: u64,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Skip the local host entirely and only query remote servers
        #[arg(long, conflicts_with = "local_hosts")]
        no_local: bool,
    },

    /// Check Webdock API connectivity
    #[command(about = "Ping the Webdock API and show rate-limit standing")]
    Ping {
        /// API token to authenticate with
        #[arg(short, long, env = "WEBDOCK_API_TOKEN_1", hide_env_values = true)]
        token: String,
    },
}
