//! Normalized server statistics model
//!
//! Every metrics source, local or remote, is reduced to a [`ServerStats`]
//! record: byte counts for memory and disk, percentages, CPU count, and a
//! status string. The record converts into a [`StatsPayload`] — the nested
//! JSON shape consumed by the UI.
//!
//! All byte fields are in bytes regardless of the source's native unit;
//! converting provider units (MiB for Webdock) happens in the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One gibibyte (2^30 bytes), used for the display-oriented `*_gb` fields.
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Kind of backend a statistics record was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// Local machine running Docker workloads, read via `sysinfo`
    DockerHost,
    /// Webdock VPS instance, read via the Webdock API
    WebdockVps,
}

impl SourceType {
    /// Returns the wire name of this source type (e.g. `"docker-host"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DockerHost => "docker-host",
            Self::WebdockVps => "webdock-vps",
        }
    }

    /// Builds the cache key namespacing a source id under this type,
    /// e.g. `"docker-host:node1"`.
    #[must_use]
    pub fn cache_key(self, source_id: &str) -> String {
        format!("{}:{source_id}", self.as_str())
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized statistics for a single server
///
/// Metric fields are optional: a degraded or failed collection leaves them
/// absent and communicates the failure through `status` and `error` instead
/// of an error return. Byte and percent fields for one resource are either
/// both present or both absent — there is no partial unit conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerStats {
    /// Display name of the server (host name or VPS slug)
    pub server_name: String,
    /// Which backend this record came from
    pub source_type: SourceType,
    /// Used memory in bytes
    pub memory_used: Option<u64>,
    /// Total memory in bytes
    pub memory_total: Option<u64>,
    /// Memory usage percentage
    pub memory_percent: Option<f64>,
    /// Used disk space in bytes (root filesystem)
    pub disk_used: Option<u64>,
    /// Total disk space in bytes (root filesystem)
    pub disk_total: Option<u64>,
    /// Disk usage percentage
    pub disk_percent: Option<f64>,
    /// Number of CPUs (physical cores when known, logical threads otherwise)
    pub cpu_count: Option<u32>,
    /// Instantaneous CPU usage percentage
    pub cpu_percent: Option<f64>,
    /// Collection status: `"active"`, `"limited"`, `"error"`, or `"unknown"`
    pub status: String,
    /// Human-readable error message when collection failed or was degraded
    pub error: Option<String>,
    /// When this record was collected
    pub timestamp: Option<DateTime<Utc>>,
}

impl ServerStats {
    /// Creates an empty record for a source with status `"unknown"`
    #[must_use]
    pub fn new(server_name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            server_name: server_name.into(),
            source_type,
            memory_used: None,
            memory_total: None,
            memory_percent: None,
            disk_used: None,
            disk_total: None,
            disk_percent: None,
            cpu_count: None,
            cpu_percent: None,
            status: "unknown".to_string(),
            error: None,
            timestamp: None,
        }
    }

    /// Converts to the nested JSON payload consumed by the UI
    ///
    /// Raw byte counts are passed through as-is (`null` when absent).
    /// Percentages and the derived `*_gb` values are rounded to two
    /// decimals and omitted (`null`) when the underlying value is absent
    /// or zero.
    #[must_use]
    pub fn to_payload(&self) -> StatsPayload {
        StatsPayload {
            server_name: self.server_name.clone(),
            source_type: self.source_type,
            memory: ResourceUsage {
                used: self.memory_used,
                total: self.memory_total,
                percent: round_nonzero(self.memory_percent),
                used_gb: bytes_to_gib(self.memory_used),
                total_gb: bytes_to_gib(self.memory_total),
            },
            disk: ResourceUsage {
                used: self.disk_used,
                total: self.disk_total,
                percent: round_nonzero(self.disk_percent),
                used_gb: bytes_to_gib(self.disk_used),
                total_gb: bytes_to_gib(self.disk_total),
            },
            cpu: CpuUsage {
                count: self.cpu_count,
                percent: round_nonzero(self.cpu_percent),
            },
            status: self.status.clone(),
            error: self.error.clone(),
            timestamp: self.timestamp.map(|t| t.to_rfc3339()),
        }
    }
}

/// JSON payload for one server, with nested `memory`/`disk`/`cpu` objects
///
/// Absent values serialize as explicit `null`s so the consuming UI sees a
/// stable shape for every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Display name of the server
    pub server_name: String,
    /// Which backend this record came from
    pub source_type: SourceType,
    /// Memory usage block
    pub memory: ResourceUsage,
    /// Disk usage block
    pub disk: ResourceUsage,
    /// CPU usage block
    pub cpu: CpuUsage,
    /// Collection status string
    pub status: String,
    /// Error message when collection failed
    pub error: Option<String>,
    /// RFC 3339 collection timestamp
    pub timestamp: Option<String>,
}

/// Usage block for one byte-counted resource (memory or disk)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Used amount in bytes
    pub used: Option<u64>,
    /// Total amount in bytes
    pub total: Option<u64>,
    /// Usage percentage, rounded to two decimals
    pub percent: Option<f64>,
    /// Used amount in GiB, rounded to two decimals
    pub used_gb: Option<f64>,
    /// Total amount in GiB, rounded to two decimals
    pub total_gb: Option<f64>,
}

/// CPU usage block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    /// Number of CPUs
    pub count: Option<u32>,
    /// Usage percentage, rounded to two decimals
    pub percent: Option<f64>,
}

/// Computes `used / total * 100`, guarding against absent or zero totals
///
/// Returns `None` when `total` is zero, so a pathological reading can never
/// produce a division error, `NaN`, or infinity.
#[must_use]
pub fn percent_of(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}

/// Rounds to two decimals, treating zero like absent (display convention)
fn round_nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0).map(round2)
}

/// Converts a byte count to GiB rounded to two decimals; absent or zero
/// byte counts yield `None`.
fn bytes_to_gib(bytes: Option<u64>) -> Option<f64> {
    bytes
        .filter(|b| *b > 0)
        .map(|b| round2(b as f64 / BYTES_PER_GIB))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
