//! Local-host metrics provider boundary
//!
//! The collector never talks to the operating system directly; it goes
//! through the [`LocalMetricsProvider`] trait so tests can substitute a
//! deterministic backend. The default implementation reads memory, the
//! root filesystem, and CPU usage via the `sysinfo` crate.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use sysinfo::{Disks, System};

use crate::stats::percent_of;

/// Errors reported by a local metrics provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider backend is not usable on this host
    #[error("system metrics provider is not available")]
    Unavailable,
    /// The backend is present but a reading failed
    #[error("failed to read system metrics: {0}")]
    Probe(String),
}

/// One reading of the local host's resource usage
///
/// Byte counts are raw bytes; percentages carry the usual zero-total guard
/// (absent rather than `NaN` when a total is unavailable).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSnapshot {
    /// Used physical memory in bytes
    pub memory_used: u64,
    /// Total physical memory in bytes
    pub memory_total: u64,
    /// Memory usage percentage
    pub memory_percent: Option<f64>,
    /// Used space on the root filesystem in bytes
    pub disk_used: u64,
    /// Total space on the root filesystem in bytes
    pub disk_total: u64,
    /// Root filesystem usage percentage
    pub disk_percent: Option<f64>,
    /// Number of logical CPUs
    pub cpu_count: u32,
    /// Instantaneous global CPU usage percentage
    pub cpu_percent: f64,
}

/// Source of local system metrics (seam for tests and alternative backends)
pub trait LocalMetricsProvider: Send + Sync {
    /// Takes one snapshot of current memory, root-disk, and CPU usage
    fn snapshot(&self) -> Result<LocalSnapshot, ProviderError>;
}

/// Default provider backed by the `sysinfo` crate
///
/// CPU usage needs two refreshes separated by the crate's minimum sampling
/// interval, so [`snapshot`](LocalMetricsProvider::snapshot) blocks for a
/// fraction of a second.
pub struct SysinfoProvider;

impl SysinfoProvider {
    /// Capability probe: returns the provider only when the host exposes
    /// usable readings (non-zero total memory). Callers degrade gracefully
    /// on `None` instead of failing.
    #[must_use]
    pub fn detect() -> Option<Self> {
        let mut sys = System::new();
        sys.refresh_memory();
        if sys.total_memory() == 0 {
            return None;
        }
        debug!("sysinfo backend available for local system metrics");
        Some(Self)
    }
}

impl LocalMetricsProvider for SysinfoProvider {
    fn snapshot(&self) -> Result<LocalSnapshot, ProviderError> {
        let mut sys = System::new();
        sys.refresh_memory();
        if sys.total_memory() == 0 {
            return Err(ProviderError::Unavailable);
        }

        // Two refreshes spaced by the minimum interval for a usable delta
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();

        let memory_total = sys.total_memory();
        let memory_used = sys.used_memory();
        let cpu_count = sys.cpus().len() as u32;
        let cpu_percent = f64::from(sys.global_cpu_info().cpu_usage());

        let (disk_used, disk_total) = root_disk_usage()?;

        Ok(LocalSnapshot {
            memory_used,
            memory_total,
            memory_percent: percent_of(memory_used, memory_total),
            disk_used,
            disk_total,
            disk_percent: percent_of(disk_used, disk_total),
            cpu_count,
            cpu_percent,
        })
    }
}

/// Reads used/total bytes for the root filesystem, falling back to the
/// largest mounted filesystem where no `/` mount exists (e.g. Windows).
fn root_disk_usage() -> Result<(u64, u64), ProviderError> {
    let disks = Disks::new_with_refreshed_list();
    let root = disks
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| disks.iter().max_by_key(|d| d.total_space()))
        .ok_or_else(|| ProviderError::Probe("no mounted filesystem found".to_string()))?;
    let total = root.total_space();
    let used = total.saturating_sub(root.available_space());
    Ok((used, total))
}
