//! Remote server discovery from environment variables
//!
//! Webdock servers are configured as indexed variable pairs starting at 1:
//!
//! ```text
//! WEBDOCK_API_TOKEN_1=token1
//! WEBDOCK_SERVER_ID_1=server1
//!
//! WEBDOCK_API_TOKEN_2=token2
//! WEBDOCK_SERVER_ID_2=server2
//! ```
//!
//! Scanning stops at the first index with a missing or empty half of the
//! pair, so configuration gaps are not skipped over silently.

use tracing::info;

/// Credentials for one configured remote server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteServerConfig {
    /// Webdock server slug
    pub server_id: String,
    /// API token authorized for that server
    pub api_token: String,
}

/// Reads the configured Webdock servers from process environment variables
#[must_use]
pub fn webdock_servers_from_env() -> Vec<RemoteServerConfig> {
    let servers = servers_from_lookup(|name| std::env::var(name).ok());
    if !servers.is_empty() {
        info!(count = servers.len(), "loaded Webdock server(s) from environment");
    }
    servers
}

/// Scans indexed `WEBDOCK_API_TOKEN_<n>` / `WEBDOCK_SERVER_ID_<n>` pairs
/// through an injectable lookup
///
/// Split out from [`webdock_servers_from_env`] so tests can supply a map
/// instead of mutating the process environment.
pub fn servers_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<RemoteServerConfig> {
    let mut servers = Vec::new();

    for index in 1.. {
        let token = lookup(&format!("WEBDOCK_API_TOKEN_{index}")).filter(|v| !v.is_empty());
        let server_id = lookup(&format!("WEBDOCK_SERVER_ID_{index}")).filter(|v| !v.is_empty());

        match (server_id, token) {
            (Some(server_id), Some(api_token)) => servers.push(RemoteServerConfig {
                server_id,
                api_token,
            }),
            _ => break,
        }
    }

    servers
}
