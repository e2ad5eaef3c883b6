//! Aggregated stats command.

use std::time::Duration;

use tracing::debug;

use hoststats_core::collector::StatsCollector;
use hoststats_core::config::webdock_servers_from_env;
use hoststats_core::stats::StatsPayload;

use crate::error::CliError;

/// Collect and print stats for all configured sources as a JSON array
pub fn cmd_stats(
    local_hosts: Vec<String>,
    ttl: u64,
    pretty: bool,
    no_local: bool,
) -> Result<(), CliError> {
    let local_hosts = if no_local {
        Vec::new()
    } else if local_hosts.is_empty() {
        vec![default_host_name()?]
    } else {
        local_hosts
    };

    let remote_servers = webdock_servers_from_env();
    debug!(
        local = local_hosts.len(),
        remote = remote_servers.len(),
        "collecting stats"
    );

    if local_hosts.is_empty() && remote_servers.is_empty() {
        return Err(CliError::Config(
            "no sources configured: pass --local-host or set \
             WEBDOCK_API_TOKEN_1/WEBDOCK_SERVER_ID_1"
                .to_string(),
        ));
    }

    let collector = StatsCollector::new(Duration::from_secs(ttl));
    let payloads: Vec<StatsPayload> = collector
        .get_all_server_stats(&local_hosts, &remote_servers)
        .iter()
        .map(hoststats_core::stats::ServerStats::to_payload)
        .collect();

    let output = if pretty {
        serde_json::to_string_pretty(&payloads)?
    } else {
        serde_json::to_string(&payloads)?
    };
    println!("{output}");

    Ok(())
}

/// The local machine's host name, lowercased for stable cache keys
fn default_host_name() -> Result<String, CliError> {
    let name = hostname::get()
        .map_err(|e| CliError::Config(format!("failed to read host name: {e}")))?;
    Ok(name.to_string_lossy().to_lowercase())
}
