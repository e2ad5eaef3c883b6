//! End-to-end aggregation scenarios with injected backends

use std::time::Duration;

use chrono::Utc;
use hoststats_core::collector::{MIB_TO_BYTES, RemoteMetricsSource, StatsCollector};
use hoststats_core::config::RemoteServerConfig;
use hoststats_core::provider::{LocalMetricsProvider, LocalSnapshot, ProviderError};
use hoststats_core::stats::percent_of;
use hoststats_core::webdock::RemoteServerMetrics;

const GIB: u64 = 1024 * 1024 * 1024;

struct StaticProvider {
    snapshot: LocalSnapshot,
}

impl StaticProvider {
    fn node1() -> Self {
        Self {
            snapshot: LocalSnapshot {
                memory_used: 2 * GIB,
                memory_total: 8 * GIB,
                memory_percent: percent_of(2 * GIB, 8 * GIB),
                disk_used: 50 * GIB,
                disk_total: 100 * GIB,
                disk_percent: percent_of(50 * GIB, 100 * GIB),
                cpu_count: 4,
                cpu_percent: 12.5,
            },
        }
    }
}

impl LocalMetricsProvider for StaticProvider {
    fn snapshot(&self) -> Result<LocalSnapshot, ProviderError> {
        Ok(self.snapshot)
    }
}

struct BrokenProvider;

impl LocalMetricsProvider for BrokenProvider {
    fn snapshot(&self) -> Result<LocalSnapshot, ProviderError> {
        Err(ProviderError::Probe("sensor read failed".to_string()))
    }
}

struct StaticRemote {
    metrics: Option<RemoteServerMetrics>,
}

impl RemoteMetricsSource for StaticRemote {
    fn server_metrics(&self, _server_id: &str, _api_token: &str) -> Option<RemoteServerMetrics> {
        self.metrics.clone()
    }
}

fn vps_metrics(slug: &str) -> RemoteServerMetrics {
    RemoteServerMetrics {
        server_slug: slug.to_string(),
        server_name: slug.to_string(),
        memory_used: Some(1024),
        memory_total: Some(4096),
        memory_percent: Some(25.0),
        disk_used: Some(10_240),
        disk_total: Some(51_200),
        disk_percent: Some(20.0),
        cpu_cores: Some(2),
        cpu_threads: Some(4),
        cpu_usage_seconds: Some(900),
        network_used: Some(120),
        network_allowed: Some(2000),
        processes: Some(83),
        status: "running".to_string(),
        ipv4: Some("203.0.113.7".to_string()),
        location: Some("fi".to_string()),
        timestamp: Some(Utc::now()),
    }
}

fn remote_config(id: &str) -> RemoteServerConfig {
    RemoteServerConfig {
        server_id: id.to_string(),
        api_token: "token".to_string(),
    }
}

#[test]
fn batch_mixes_sources_in_input_order() {
    let collector = StatsCollector::with_sources(
        Duration::from_secs(60),
        Some(Box::new(StaticProvider::node1())),
        Box::new(StaticRemote {
            metrics: Some(vps_metrics("vps1")),
        }),
    );

    let all = collector.get_all_server_stats(
        &["node1".to_string(), "node2".to_string()],
        &[remote_config("vps1")],
    );

    assert_eq!(all.len(), 3);
    assert_eq!(all[0].server_name, "node1");
    assert_eq!(all[1].server_name, "node2");
    assert_eq!(all[2].server_name, "vps1");
    assert!(all.iter().take(2).all(|s| s.status == "active"));
    assert_eq!(all[2].status, "running");
}

#[test]
fn one_failing_source_does_not_poison_the_batch() {
    let collector = StatsCollector::with_sources(
        Duration::from_secs(60),
        Some(Box::new(BrokenProvider)),
        Box::new(StaticRemote {
            metrics: Some(vps_metrics("vps1")),
        }),
    );

    let all = collector.get_all_server_stats(&["node1".to_string()], &[remote_config("vps1")]);

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].status, "error");
    assert!(all[0].error.as_deref().unwrap().contains("sensor read failed"));
    assert!(all[0].memory_used.is_none());
    assert_eq!(all[1].status, "running");
    assert_eq!(all[1].memory_used, Some(1024 * MIB_TO_BYTES));
}

#[test]
fn payload_pipeline_produces_ui_shape() {
    let collector = StatsCollector::with_sources(
        Duration::from_secs(60),
        Some(Box::new(StaticProvider::node1())),
        Box::new(StaticRemote { metrics: None }),
    );

    let stats = collector.get_docker_host_stats("node1");
    let json = serde_json::to_value(stats.to_payload()).unwrap();

    assert_eq!(json["server_name"], "node1");
    assert_eq!(json["source_type"], "docker-host");
    assert_eq!(json["status"], "active");
    assert_eq!(json["memory"]["percent"], 25.0);
    assert_eq!(json["memory"]["used_gb"], 2.0);
    assert_eq!(json["memory"]["total_gb"], 8.0);
    assert_eq!(json["disk"]["percent"], 50.0);
    assert_eq!(json["cpu"]["count"], 4);
    assert_eq!(json["cpu"]["percent"], 12.5);
    assert!(json["error"].is_null());
    assert!(json["timestamp"].is_string());
}

#[test]
fn error_payload_keeps_stable_shape() {
    let collector = StatsCollector::with_sources(
        Duration::from_secs(60),
        None,
        Box::new(StaticRemote { metrics: None }),
    );

    let stats = collector.get_webdock_vps_stats("vps1", "token");
    let json = serde_json::to_value(stats.to_payload()).unwrap();

    assert_eq!(json["status"], "error");
    assert_eq!(json["error"], "Failed to fetch Webdock metrics");
    // The nested blocks are present with null members, not missing
    assert!(json["memory"]["used"].is_null());
    assert!(json["disk"]["total_gb"].is_null());
    assert!(json["cpu"]["count"].is_null());
}

#[test]
fn expired_entries_are_refetched() {
    let collector = StatsCollector::with_sources(
        Duration::from_millis(30),
        Some(Box::new(StaticProvider::node1())),
        Box::new(StaticRemote { metrics: None }),
    );

    let first = collector.get_docker_host_stats("node1");
    std::thread::sleep(Duration::from_millis(50));
    let second = collector.get_docker_host_stats("node1");

    // A fresh record was collected after expiry (new timestamp)
    assert!(second.timestamp >= first.timestamp);
    assert_eq!(collector.cache_len(), 1);
}

#[test]
fn invalidation_is_substring_scoped() {
    let collector = StatsCollector::with_sources(
        Duration::from_secs(60),
        Some(Box::new(StaticProvider::node1())),
        Box::new(StaticRemote {
            metrics: Some(vps_metrics("hostA-vps")),
        }),
    );

    collector.get_docker_host_stats("hostA");
    collector.get_docker_host_stats("hostB");
    collector.get_webdock_vps_stats("hostA-vps", "token");
    assert_eq!(collector.cache_len(), 3);

    collector.invalidate_cache(Some("hostA"));
    assert_eq!(collector.cache_len(), 1);

    collector.invalidate_cache(None);
    assert_eq!(collector.cache_len(), 0);
}
