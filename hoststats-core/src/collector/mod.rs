//! Unified stats collector with per-key TTL caching
//!
//! [`StatsCollector`] wraps the local-host provider and the Webdock client
//! behind one interface and caches results per source key. Every public
//! operation returns a [`ServerStats`] record — failures are communicated
//! through the record's `status`/`error` fields, never through an error
//! return, so one source's failure cannot affect another's result in a
//! batch call.
//!
//! The cache is deliberately coarse: a single mutex guards the whole map,
//! checks and writes are individually locked, and the underlying fetch
//! happens outside the lock. Two concurrent callers hitting the same cold
//! key may both fetch; the later write simply lands newer data. Error
//! results are cached under the same TTL as successes, so a failing source
//! is re-attempted only after the TTL elapses.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::RemoteServerConfig;
use crate::provider::{LocalMetricsProvider, SysinfoProvider};
use crate::stats::{ServerStats, SourceType};
use crate::webdock::{RemoteServerMetrics, WebdockClient};

/// Default cache time-to-live
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// MiB to bytes conversion factor (Webdock reports memory and disk in MiB)
pub const MIB_TO_BYTES: u64 = 1024 * 1024;

/// Source of combined remote VPS metrics (seam over [`WebdockClient`])
pub trait RemoteMetricsSource: Send + Sync {
    /// Fetches the combined metrics snapshot for one server, or `None`
    /// when the provider could not deliver one
    fn server_metrics(&self, server_id: &str, api_token: &str) -> Option<RemoteServerMetrics>;
}

/// Default remote source: one short-lived Webdock client per query
struct WebdockSource;

impl RemoteMetricsSource for WebdockSource {
    fn server_metrics(&self, server_id: &str, api_token: &str) -> Option<RemoteServerMetrics> {
        match WebdockClient::new(api_token) {
            Ok(client) => client.get_server_metrics(server_id),
            Err(e) => {
                error!(server_id, error = %e, "failed to build Webdock client");
                None
            }
        }
    }
}

/// Converts an optional MiB count to bytes
///
/// A value large enough to overflow `u64` bytes is not a real reading;
/// it is treated as absent rather than wrapped or panicked on.
fn mib_to_bytes(mib: Option<u64>) -> Option<u64> {
    mib.and_then(|mib| mib.checked_mul(MIB_TO_BYTES))
}

struct CacheEntry {
    stats: ServerStats,
    cached_at: Instant,
}

/// Unified stats collector for Docker hosts and Webdock VPS instances
pub struct StatsCollector {
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
    local: Option<Box<dyn LocalMetricsProvider>>,
    remote: Box<dyn RemoteMetricsSource>,
}

impl StatsCollector {
    /// Creates a collector with the given cache TTL and default backends
    ///
    /// The local provider is probed at construction; when unavailable,
    /// Docker-host stats degrade to `status="limited"` instead of failing.
    #[must_use]
    pub fn new(cache_ttl: Duration) -> Self {
        let local = SysinfoProvider::detect()
            .map(|provider| Box::new(provider) as Box<dyn LocalMetricsProvider>);
        if local.is_none() {
            info!("system metrics provider unavailable - local host stats will be limited");
        }
        Self::with_sources(cache_ttl, local, Box::new(WebdockSource))
    }

    /// Creates a collector with explicit backends (used by tests)
    #[must_use]
    pub fn with_sources(
        cache_ttl: Duration,
        local: Option<Box<dyn LocalMetricsProvider>>,
        remote: Box<dyn RemoteMetricsSource>,
    ) -> Self {
        Self {
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
            local,
            remote,
        }
    }

    /// Process-wide shared collector, lazily constructed with the default
    /// TTL on first use
    ///
    /// Consumers that need a different TTL or injected backends construct
    /// their own instance instead.
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<StatsCollector> = OnceLock::new();
        SHARED.get_or_init(|| Self::new(DEFAULT_CACHE_TTL))
    }

    /// Returns the cached record for a key when it exists and is younger
    /// than the TTL
    fn get_cached(&self, key: &str) -> Option<ServerStats> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(key)
            .filter(|entry| entry.cached_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.stats.clone())
    }

    fn set_cached(&self, key: String, stats: &ServerStats) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key,
                CacheEntry {
                    stats: stats.clone(),
                    cached_at: Instant::now(),
                },
            );
        }
    }

    /// System stats for a Docker host (the local machine)
    ///
    /// Cached per host name. Statuses: `"active"` on success, `"limited"`
    /// when no provider is available, `"error"` when the provider failed —
    /// all three outcomes are cached.
    pub fn get_docker_host_stats(&self, host_name: &str) -> ServerStats {
        let key = SourceType::DockerHost.cache_key(host_name);
        if let Some(cached) = self.get_cached(&key) {
            debug!(key = %key, "returning cached stats");
            return cached;
        }

        let mut stats = ServerStats::new(host_name, SourceType::DockerHost);
        stats.timestamp = Some(Utc::now());

        match self.local.as_deref() {
            None => {
                stats.status = "limited".to_string();
                stats.error = Some("system metrics provider not available".to_string());
            }
            Some(provider) => match provider.snapshot() {
                Ok(snap) => {
                    stats.memory_used = Some(snap.memory_used);
                    stats.memory_total = Some(snap.memory_total);
                    stats.memory_percent = snap.memory_percent;
                    stats.disk_used = Some(snap.disk_used);
                    stats.disk_total = Some(snap.disk_total);
                    stats.disk_percent = snap.disk_percent;
                    stats.cpu_count = Some(snap.cpu_count);
                    stats.cpu_percent = Some(snap.cpu_percent);
                    stats.status = "active".to_string();
                }
                Err(e) => {
                    error!(host = host_name, error = %e, "error collecting local system stats");
                    stats.error = Some(e.to_string());
                    stats.status = "error".to_string();
                }
            },
        }

        self.set_cached(key, &stats);
        stats
    }

    /// Stats for a Webdock VPS instance
    ///
    /// Cached per server id. MiB values from the provider are converted to
    /// bytes; percent fields are copied verbatim; `cpu_count` prefers
    /// physical cores and falls back to logical threads.
    pub fn get_webdock_vps_stats(&self, server_id: &str, api_token: &str) -> ServerStats {
        let key = SourceType::WebdockVps.cache_key(server_id);
        if let Some(cached) = self.get_cached(&key) {
            debug!(key = %key, "returning cached stats");
            return cached;
        }

        let mut stats = ServerStats::new(server_id, SourceType::WebdockVps);
        stats.timestamp = Some(Utc::now());

        match self.remote.server_metrics(server_id, api_token) {
            Some(remote) => {
                stats.memory_used = mib_to_bytes(remote.memory_used);
                stats.memory_total = mib_to_bytes(remote.memory_total);
                stats.memory_percent = remote.memory_percent;
                stats.disk_used = mib_to_bytes(remote.disk_used);
                stats.disk_total = mib_to_bytes(remote.disk_total);
                stats.disk_percent = remote.disk_percent;
                stats.cpu_count = remote.cpu_cores.or(remote.cpu_threads);
                stats.status = remote.status;
            }
            None => {
                error!(server_id, "no metrics returned for Webdock server");
                stats.error = Some("Failed to fetch Webdock metrics".to_string());
                stats.status = "error".to_string();
            }
        }

        self.set_cached(key, &stats);
        stats
    }

    /// Stats for all configured sources: local hosts first, then remote
    /// servers, in input order
    ///
    /// Remote entries without a non-empty id and token are skipped. A
    /// failing source contributes its error-shaped record and never aborts
    /// the batch.
    #[must_use]
    pub fn get_all_server_stats(
        &self,
        local_hosts: &[String],
        remote_servers: &[RemoteServerConfig],
    ) -> Vec<ServerStats> {
        let mut all_stats = Vec::with_capacity(local_hosts.len() + remote_servers.len());

        for host_name in local_hosts {
            all_stats.push(self.get_docker_host_stats(host_name));
        }

        for server in remote_servers {
            if server.server_id.is_empty() || server.api_token.is_empty() {
                warn!(
                    server_id = %server.server_id,
                    "skipping remote server with incomplete credentials"
                );
                continue;
            }
            all_stats.push(self.get_webdock_vps_stats(&server.server_id, &server.api_token));
        }

        all_stats
    }

    /// Invalidates cached entries
    ///
    /// With `None`, clears the whole cache. With `Some(s)`, removes every
    /// entry whose key contains `s` as a literal substring.
    pub fn invalidate_cache(&self, key_substring: Option<&str>) {
        if let Ok(mut cache) = self.cache.lock() {
            match key_substring {
                Some(needle) => {
                    cache.retain(|key, _| !key.contains(needle));
                }
                None => cache.clear(),
            }
        }
    }

    /// Number of currently stored cache entries, valid or stale
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}
