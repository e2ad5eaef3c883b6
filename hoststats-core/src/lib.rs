//! `Hoststats` Core Library
//!
//! This crate aggregates server resource metrics (memory, disk, CPU) from
//! heterogeneous backends and normalizes them into one common statistics
//! shape for display:
//!
//! - Docker hosts, read from the local machine via the `sysinfo` crate
//! - Webdock VPS instances, read from the Webdock HTTP API
//!
//! # Crate Structure
//!
//! - [`stats`] - Normalized [`stats::ServerStats`] model and its JSON payload
//! - [`collector`] - Unified [`collector::StatsCollector`] with per-key TTL caching
//! - [`webdock`] - Webdock API client and multi-stage metrics assembly
//! - [`provider`] - Local-host metrics provider boundary (trait + `sysinfo` backend)
//! - [`config`] - Remote server discovery from environment variables
//! - [`crate::tracing`] - Structured logging bootstrap for binaries
//!
//! This crate is UI-free: it produces the JSON consumed by whatever front
//! end renders it. All calls are synchronous and blocking; the only shared
//! mutable state is the collector's cache behind a single mutex.

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod collector;
pub mod config;
pub mod provider;
pub mod stats;
pub mod tracing;
pub mod webdock;

pub use collector::{DEFAULT_CACHE_TTL, MIB_TO_BYTES, RemoteMetricsSource, StatsCollector};
pub use config::{RemoteServerConfig, servers_from_lookup, webdock_servers_from_env};
pub use provider::{LocalMetricsProvider, LocalSnapshot, ProviderError, SysinfoProvider};
pub use stats::{CpuUsage, ResourceUsage, ServerStats, SourceType, StatsPayload, percent_of};
pub use webdock::{
    RateLimitInfo, RemoteServerMetrics, ServerStatusFilter, WebdockClient, WebdockError,
    WebdockResult,
};
