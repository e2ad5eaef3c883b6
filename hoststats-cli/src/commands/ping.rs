//! Webdock API connectivity check command.

use hoststats_core::webdock::WebdockClient;

use crate::error::CliError;

/// Ping the Webdock API and report rate-limit standing
pub fn cmd_ping(token: &str) -> Result<(), CliError> {
    let client = WebdockClient::new(token)?;

    if !client.ping() {
        return Err(CliError::Remote(
            "ping failed: API unreachable or token rejected".to_string(),
        ));
    }

    let info = client.get_rate_limit_info();
    println!("Webdock API: ok");
    println!("Rate limit:  {}/{} requests remaining", info.remaining, info.limit);
    match info.reset {
        Some(reset) => println!("Resets at:   {}", reset.to_rfc3339()),
        None => println!("Resets at:   unknown"),
    }

    Ok(())
}
