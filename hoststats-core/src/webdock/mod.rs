//! Webdock API client for fetching VPS server metrics
//!
//! Wraps the read-only parts of the Webdock v1 API behind one client:
//! liveness ping, server listing and lookup, hardware profiles, and
//! instant (real-time) usage samples. The headline operation is
//! [`WebdockClient::get_server_metrics`], which combines three endpoint
//! calls into one [`RemoteServerMetrics`] snapshot while tolerating
//! partial failure at each stage.
//!
//! Every HTTP call funnels through one request method that attaches auth
//! headers, enforces a fixed timeout, records rate-limit headers, and maps
//! any transport or status failure to "no data". Callers see `Option`,
//! never a transport error.
//!
//! API documentation: <https://api.webdock.io/v1>

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::stats::percent_of;

/// Production Webdock API endpoint
pub const BASE_URL: &str = "https://api.webdock.io/v1";

/// Documented request quota per hour, used as the initial `remaining` value
pub const RATE_LIMIT_CEILING: u32 = 5000;

/// Fixed timeout applied to every request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while constructing a [`WebdockClient`]
///
/// Request-time failures never surface as errors; they are logged and
/// reported as absent data instead.
#[derive(Debug, Error)]
pub enum WebdockError {
    /// The API token contains bytes that cannot go into an HTTP header
    #[error("API token contains invalid header characters")]
    InvalidToken,
    /// The underlying HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Result type for client construction
pub type WebdockResult<T> = Result<T, WebdockError>;

/// Server listing filter accepted by the `/servers` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerStatusFilter {
    /// All servers regardless of state
    All,
    /// Provisioned and running servers
    #[default]
    Active,
    /// Suspended servers
    Suspended,
}

impl ServerStatusFilter {
    /// Query-string value for this filter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

/// Basic server identity from `GET /servers/{slug}`
///
/// Every field is optional: the client tolerates missing nested data from
/// the provider rather than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerDetails {
    /// Server slug (shortname used in API paths)
    pub slug: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Provider-reported status (e.g. `"running"`, `"suspended"`)
    pub status: Option<String>,
    /// Primary IPv4 address
    pub ipv4: Option<String>,
    /// Data-center location id
    pub location: Option<String>,
    /// Slug of the hardware profile this server is provisioned on
    pub profile: Option<String>,
}

/// Hardware profile from `GET /profiles`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerProfile {
    /// Profile slug
    pub slug: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Total RAM in MiB
    pub ram: Option<u64>,
    /// Total disk in MiB
    pub disk: Option<u64>,
    /// CPU allocation
    pub cpu: Option<ProfileCpu>,
}

/// CPU allocation inside a hardware profile
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileCpu {
    /// Physical cores
    pub cores: Option<u32>,
    /// Logical threads
    pub threads: Option<u32>,
}

/// Instant usage sample from `GET /servers/{slug}/metrics/now`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstantMetrics {
    /// Memory sampling block
    pub memory: Option<MemoryInstant>,
    /// Disk sampling block
    pub disk: Option<DiskInstant>,
    /// CPU sampling block
    pub cpu: Option<CpuInstant>,
    /// Network totals block
    pub network: Option<NetworkInstant>,
    /// Process count block
    pub processes: Option<ProcessesInstant>,
}

/// Memory part of an instant sample
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryInstant {
    /// Most recent usage sampling (amount in MiB)
    pub latest_usage_sampling: Option<Sampling>,
}

/// Disk part of an instant sample
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiskInstant {
    /// Allowed (allocated) disk in MiB — fresher than the profile total
    pub allowed: Option<u64>,
    /// Most recent usage sampling (amount in MiB)
    pub last_samplings: Option<Sampling>,
}

/// CPU part of an instant sample
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpuInstant {
    /// Most recent usage sampling (amount in CPU-seconds)
    pub latest_usage_sampling: Option<Sampling>,
}

/// Network part of an instant sample (GiB totals for the period)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkInstant {
    /// Transferred so far in GiB
    pub total: Option<u64>,
    /// Allowed transfer in GiB
    pub allowed: Option<u64>,
}

/// Process-count part of an instant sample
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessesInstant {
    /// Most recent process-count sampling
    pub latest_processes_sampling: Option<Sampling>,
}

/// A single `{ "amount": … }` sampling object
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sampling {
    /// Sampled amount in the endpoint's native unit
    pub amount: Option<u64>,
}

/// Combined server metrics in the provider's native units (MiB)
///
/// Assembled fresh per query from the server details, hardware profile,
/// and instant sample; never mutated afterwards. The collector converts
/// it into the normalized byte-based [`crate::stats::ServerStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteServerMetrics {
    /// Server slug the query was made for
    pub server_slug: String,
    /// Display name (falls back to the slug)
    pub server_name: String,
    /// Used memory in MiB
    pub memory_used: Option<u64>,
    /// Total memory in MiB
    pub memory_total: Option<u64>,
    /// Memory usage percentage
    pub memory_percent: Option<f64>,
    /// Used disk in MiB
    pub disk_used: Option<u64>,
    /// Total disk in MiB
    pub disk_total: Option<u64>,
    /// Disk usage percentage
    pub disk_percent: Option<f64>,
    /// Physical CPU cores from the profile
    pub cpu_cores: Option<u32>,
    /// Logical CPU threads from the profile
    pub cpu_threads: Option<u32>,
    /// Accumulated CPU usage in seconds
    pub cpu_usage_seconds: Option<u64>,
    /// Network transferred in GiB
    pub network_used: Option<u64>,
    /// Network transfer allowance in GiB
    pub network_allowed: Option<u64>,
    /// Process count
    pub processes: Option<u64>,
    /// Provider-reported server status
    pub status: String,
    /// Primary IPv4 address
    pub ipv4: Option<String>,
    /// Data-center location id
    pub location: Option<String>,
    /// When the snapshot was assembled
    pub timestamp: Option<DateTime<Utc>>,
}

/// Rate-limit bookkeeping reflected from the most recent response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window
    pub remaining: u32,
    /// When the window resets, if the provider reported it
    pub reset: Option<DateTime<Utc>>,
    /// Window ceiling
    pub limit: u32,
}

struct RateLimitState {
    remaining: u32,
    reset: Option<DateTime<Utc>>,
}

/// Client for the Webdock API v1
///
/// # Usage
///
/// ```no_run
/// use hoststats_core::webdock::WebdockClient;
///
/// let client = WebdockClient::new("your-token-here").unwrap();
/// if let Some(metrics) = client.get_server_metrics("my-server-slug") {
///     println!("{} is {}", metrics.server_name, metrics.status);
/// }
/// ```
pub struct WebdockClient {
    http: Client,
    base_url: String,
    rate_limit: Mutex<RateLimitState>,
}

impl WebdockClient {
    /// Creates a client for the production API endpoint
    pub fn new(api_token: &str) -> WebdockResult<Self> {
        Self::with_base_url(api_token, BASE_URL)
    }

    /// Creates a client against a custom endpoint (used by tests)
    pub fn with_base_url(api_token: &str, base_url: impl Into<String>) -> WebdockResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_token}"))
            .map_err(|_| WebdockError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("X-Application", HeaderValue::from_static("hoststats/0.1"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            rate_limit: Mutex::new(RateLimitState {
                remaining: RATE_LIMIT_CEILING,
                reset: None,
            }),
        })
    }

    /// Single request funnel: GET a JSON body, or `None` on any failure
    ///
    /// Non-2xx statuses and transport errors are treated identically; the
    /// distinction only shows up in the logs.
    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Option<T> {
        let url = format!("{}{path}", self.base_url);
        let response = match self.http.get(&url).query(query).send() {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, url = %url, "Webdock API request failed");
                return None;
            }
        };

        self.record_rate_limit(response.headers());

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Webdock API returned an error status");
            if let Ok(body) = response.text() {
                debug!(body = %body, "error response body");
            }
            return None;
        }

        match response.json::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, url = %url, "failed to decode Webdock API response");
                None
            }
        }
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        let Ok(mut state) = self.rate_limit.lock() else {
            return;
        };
        if let Some(remaining) = parse_rate_limit_remaining(headers) {
            state.remaining = remaining;
        }
        if let Some(reset) = parse_rate_limit_reset(headers) {
            state.reset = Some(reset);
        }
    }

    /// Liveness and auth check against the provider's sentinel response
    #[must_use]
    pub fn ping(&self) -> bool {
        self.get_json::<Value>("/ping", &[])
            .as_ref()
            .is_some_and(is_ping_ok)
    }

    /// Lists servers on the account, optionally filtered by status
    ///
    /// Returns an empty list on failure.
    #[must_use]
    pub fn get_servers(&self, status: ServerStatusFilter) -> Vec<ServerDetails> {
        self.get_json("/servers", &[("status", status.as_str())])
            .unwrap_or_default()
    }

    /// Fetches identity details for one server
    #[must_use]
    pub fn get_server(&self, server_slug: &str) -> Option<ServerDetails> {
        self.get_json(&format!("/servers/{server_slug}"), &[])
    }

    /// Fetches the hardware profile carrying RAM/disk/CPU totals
    ///
    /// The endpoint returns a list; the entry matching the slug wins, with
    /// the first entry as a fallback.
    #[must_use]
    pub fn get_server_profile(&self, profile_slug: &str) -> Option<ServerProfile> {
        let mut profiles: Vec<ServerProfile> =
            self.get_json("/profiles", &[("profileSlug", profile_slug)])?;
        if profiles.is_empty() {
            return None;
        }
        let index = profiles
            .iter()
            .position(|p| p.slug.as_deref() == Some(profile_slug))
            .unwrap_or(0);
        Some(profiles.swap_remove(index))
    }

    /// Fetches the current instant usage sample for one server
    #[must_use]
    pub fn get_instant_metrics(&self, server_slug: &str) -> Option<InstantMetrics> {
        self.get_json(&format!("/servers/{server_slug}/metrics/now"), &[])
    }

    /// Combined metrics: server details + profile totals + instant usage
    ///
    /// The server lookup is mandatory; profile and instant stages are
    /// best-effort, so a partially-available server still yields a record
    /// with the corresponding fields absent.
    #[must_use]
    pub fn get_server_metrics(&self, server_slug: &str) -> Option<RemoteServerMetrics> {
        let Some(server) = self.get_server(server_slug) else {
            warn!(slug = server_slug, "could not fetch server details");
            return None;
        };

        let profile = server
            .profile
            .as_deref()
            .and_then(|slug| self.get_server_profile(slug));
        let instant = self.get_instant_metrics(server_slug);

        Some(assemble_metrics(
            server_slug,
            &server,
            profile.as_ref(),
            instant.as_ref(),
        ))
    }

    /// Fetches metrics for every active server, in provider listing order
    ///
    /// Servers whose per-server fetch comes back absent are skipped.
    #[must_use]
    pub fn get_all_server_metrics(&self) -> Vec<RemoteServerMetrics> {
        self.get_servers(ServerStatusFilter::Active)
            .iter()
            .filter_map(|server| server.slug.as_deref())
            .filter_map(|slug| self.get_server_metrics(slug))
            .collect()
    }

    /// Current rate-limit bookkeeping
    ///
    /// Reflects the most recent response's headers; tracked for visibility
    /// only, never used to throttle.
    #[must_use]
    pub fn get_rate_limit_info(&self) -> RateLimitInfo {
        let (remaining, reset) = self
            .rate_limit
            .lock()
            .map(|state| (state.remaining, state.reset))
            .unwrap_or((RATE_LIMIT_CEILING, None));
        RateLimitInfo {
            remaining,
            reset,
            limit: RATE_LIMIT_CEILING,
        }
    }
}

/// Merges the three endpoint results into one snapshot
///
/// Profile supplies totals first; the instant sample's `disk.allowed`
/// overrides the profile disk total when present (instant data is fresher).
/// Percentages are computed only when both operands exist and the total is
/// non-zero.
fn assemble_metrics(
    server_slug: &str,
    server: &ServerDetails,
    profile: Option<&ServerProfile>,
    instant: Option<&InstantMetrics>,
) -> RemoteServerMetrics {
    let mut metrics = RemoteServerMetrics {
        server_slug: server_slug.to_string(),
        server_name: server
            .name
            .clone()
            .unwrap_or_else(|| server_slug.to_string()),
        memory_used: None,
        memory_total: None,
        memory_percent: None,
        disk_used: None,
        disk_total: None,
        disk_percent: None,
        cpu_cores: None,
        cpu_threads: None,
        cpu_usage_seconds: None,
        network_used: None,
        network_allowed: None,
        processes: None,
        status: server
            .status
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        ipv4: server.ipv4.clone(),
        location: server.location.clone(),
        timestamp: Some(Utc::now()),
    };

    if let Some(profile) = profile {
        metrics.memory_total = profile.ram;
        metrics.disk_total = profile.disk;
        if let Some(cpu) = profile.cpu {
            metrics.cpu_cores = cpu.cores;
            metrics.cpu_threads = cpu.threads;
        }
    }

    if let Some(instant) = instant {
        metrics.memory_used = instant
            .memory
            .and_then(|m| m.latest_usage_sampling)
            .and_then(|s| s.amount);
        if let Some(disk) = instant.disk {
            if disk.allowed.is_some() {
                metrics.disk_total = disk.allowed;
            }
            metrics.disk_used = disk.last_samplings.and_then(|s| s.amount);
        }
        metrics.cpu_usage_seconds = instant
            .cpu
            .and_then(|c| c.latest_usage_sampling)
            .and_then(|s| s.amount);
        if let Some(network) = instant.network {
            metrics.network_used = network.total;
            metrics.network_allowed = network.allowed;
        }
        metrics.processes = instant
            .processes
            .and_then(|p| p.latest_processes_sampling)
            .and_then(|s| s.amount);
    }

    metrics.memory_percent = maybe_percent(metrics.memory_used, metrics.memory_total);
    metrics.disk_percent = maybe_percent(metrics.disk_used, metrics.disk_total);
    metrics
}

fn maybe_percent(used: Option<u64>, total: Option<u64>) -> Option<f64> {
    match (used, total) {
        (Some(used), Some(total)) => percent_of(used, total),
        _ => None,
    }
}

/// Checks the `/ping` body against the provider sentinel
fn is_ping_ok(body: &Value) -> bool {
    body.get("webdock").and_then(Value::as_str) == Some("rocks")
}

fn parse_rate_limit_remaining(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("X-RateLimit-Remaining")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    parse_reset_timestamp(headers.get("X-RateLimit-Reset")?.to_str().ok()?)
}

fn parse_reset_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.parse::<i64>().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}
