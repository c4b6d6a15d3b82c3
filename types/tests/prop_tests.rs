use proptest::prelude::*;
use std::time::Duration;

use attest_types::{ConsensusRequirements, Timestamp};

proptest! {
    /// Any threshold in (0, 1] with at least one validator is accepted.
    #[test]
    fn valid_requirements_accepted(
        min in 1u32..1000,
        threshold in 0.0001f64..=1.0,
        timeout_ms in 1u64..10_000_000,
    ) {
        let req = ConsensusRequirements::new(min, threshold, Duration::from_millis(timeout_ms));
        prop_assert!(req.is_ok());
        let req = req.unwrap();
        prop_assert_eq!(req.min_validators(), min);
        prop_assert!(req.consensus_threshold() > 0.0 && req.consensus_threshold() <= 1.0);
    }

    /// Zero validators is always rejected, whatever else is set.
    #[test]
    fn zero_validators_rejected(threshold in 0.0001f64..=1.0, timeout_ms in 1u64..10_000_000) {
        prop_assert!(ConsensusRequirements::new(0, threshold, Duration::from_millis(timeout_ms)).is_err());
    }

    /// Thresholds outside (0, 1] are rejected.
    #[test]
    fn out_of_range_threshold_rejected(threshold in prop_oneof![-10.0f64..=0.0, 1.0001f64..10.0]) {
        prop_assert!(ConsensusRequirements::new(3, threshold, Duration::from_secs(1)).is_err());
    }

    /// Wire serialization preserves validated requirements.
    #[test]
    fn requirements_json_preserves_values(min in 1u32..100, timeout_ms in 1u64..1_000_000) {
        let req = ConsensusRequirements::new(min, 0.5, Duration::from_millis(timeout_ms)).unwrap();
        let json = serde_json::to_string(&req).unwrap();
        let back: ConsensusRequirements = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, req);
    }

    /// Millisecond conversion truncates to whole seconds.
    #[test]
    fn timestamp_from_millis_truncates(ms in 0u64..u64::MAX / 2) {
        prop_assert_eq!(Timestamp::from_millis(ms).as_secs(), ms / 1000);
    }
}
