//! Property tests for the UI payload derivation rules

use proptest::prelude::*;

use hoststats_core::stats::{ServerStats, SourceType};

fn arb_source_type() -> impl Strategy<Value = SourceType> {
    prop_oneof![Just(SourceType::DockerHost), Just(SourceType::WebdockVps)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A derived GiB value exists exactly when the byte value is present
    /// and non-zero, and the raw byte value always passes through untouched
    #[test]
    fn gb_presence_tracks_nonzero_bytes(
        source in arb_source_type(),
        bytes in proptest::option::of(any::<u64>()),
    ) {
        let mut stats = ServerStats::new("s1", source);
        stats.memory_used = bytes;

        let payload = stats.to_payload();
        prop_assert_eq!(payload.memory.used, bytes);
        match bytes {
            Some(b) if b > 0 => prop_assert!(payload.memory.used_gb.is_some()),
            _ => prop_assert!(payload.memory.used_gb.is_none()),
        }
    }

    /// Percentages are filtered when zero and rounded to two decimals
    /// otherwise
    #[test]
    fn percent_is_rounded_and_zero_filtered(percent in proptest::option::of(0.0f64..=100.0)) {
        let mut stats = ServerStats::new("s1", SourceType::DockerHost);
        stats.cpu_percent = percent;

        let payload = stats.to_payload();
        match percent {
            Some(p) if p != 0.0 => {
                let rounded = payload.cpu.percent.unwrap();
                prop_assert!((rounded - p).abs() <= 0.005 + 1e-9);
                prop_assert_eq!(rounded, (rounded * 100.0).round() / 100.0);
            }
            _ => prop_assert!(payload.cpu.percent.is_none()),
        }
    }

    /// Payload derivation keeps identity fields and status verbatim
    #[test]
    fn payload_preserves_identity(
        source in arb_source_type(),
        name in "[a-z][a-z0-9-]{0,20}",
        status in prop_oneof![
            Just("active"), Just("limited"), Just("error"), Just("running")
        ],
    ) {
        let mut stats = ServerStats::new(name.clone(), source);
        stats.status = status.to_string();

        let payload = stats.to_payload();
        prop_assert_eq!(payload.server_name, name);
        prop_assert_eq!(payload.source_type, source);
        prop_assert_eq!(payload.status, status);
    }

    /// Every payload serializes to JSON with the full nested shape present
    #[test]
    fn payload_json_shape_is_stable(
        source in arb_source_type(),
        mem in proptest::option::of(any::<u64>()),
    ) {
        let mut stats = ServerStats::new("s1", source);
        stats.memory_total = mem;

        let json = serde_json::to_value(stats.to_payload()).unwrap();
        for block in ["memory", "disk"] {
            for field in ["used", "total", "percent", "used_gb", "total_gb"] {
                prop_assert!(json[block].get(field).is_some());
            }
        }
        prop_assert!(json["cpu"].get("count").is_some());
        prop_assert!(json["cpu"].get("percent").is_some());
    }
}
