//! Property tests for unit conversion and percentage arithmetic

use proptest::prelude::*;

use hoststats_core::collector::MIB_TO_BYTES;
use hoststats_core::stats::percent_of;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `percent_of` never produces NaN or infinity, whatever the inputs
    #[test]
    fn percent_of_is_always_finite(used in any::<u64>(), total in any::<u64>()) {
        if let Some(p) = percent_of(used, total) {
            prop_assert!(p.is_finite());
            prop_assert!(p >= 0.0);
        } else {
            prop_assert_eq!(total, 0);
        }
    }

    /// A zero total never yields a value
    #[test]
    fn percent_of_zero_total_is_absent(used in any::<u64>()) {
        prop_assert_eq!(percent_of(used, 0), None);
    }

    /// When `used <= total`, the percentage stays within 0..=100
    #[test]
    fn percent_of_is_bounded_for_sane_inputs(total in 1u64..=u64::MAX, frac in 0.0f64..=1.0) {
        let used = (total as f64 * frac) as u64;
        let p = percent_of(used.min(total), total).unwrap();
        prop_assert!((0.0..=100.0 + 1e-9).contains(&p));
    }

    /// MiB-to-bytes conversion is exact and reversible for realistic sizes
    #[test]
    fn mib_conversion_roundtrips(mib in 0u64..=16 * 1024 * 1024) {
        let bytes = mib * MIB_TO_BYTES;
        prop_assert_eq!(bytes / MIB_TO_BYTES, mib);
        prop_assert_eq!(bytes % MIB_TO_BYTES, 0);
    }

    /// Converting MiB to bytes preserves ordering
    #[test]
    fn mib_conversion_is_monotonic(a in 0u64..=1 << 40, b in 0u64..=1 << 40) {
        let (a, b) = (a.min(b), a.max(b));
        prop_assert!(a * MIB_TO_BYTES <= b * MIB_TO_BYTES);
    }
}
