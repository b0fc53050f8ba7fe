//! Property-based tests for ClipperSettings serialization round-trip.
//!
//! Settings written by the engine must load back without data loss for
//! arbitrary valid inputs, both in memory and through the settings file.

use proptest::prelude::*;
use wishclip::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use wishclip::types::settings::{ApiSettings, ClipperSettings, ExtractionPolicy, TimingSettings};

fn arb_api_settings() -> impl Strategy<Value = ApiSettings> {
    ("https://[a-z]{3,12}\\.(app|com)/api", "[a-z]{3,12}\\.(app|com)", 1u64..120_000).prop_map(
        |(base_url, cookie_domain, timeout_ms)| ApiSettings {
            base_url,
            cookie_domain,
            timeout_ms,
        },
    )
}

fn arb_extraction_policy() -> impl Strategy<Value = ExtractionPolicy> {
    (
        0u64..1_000_000,
        prop::collection::vec("[a-z0-9]{1,10}", 0..16),
        1usize..2_000,
        0u32..100,
        100u32..1_000_000,
    )
        .prop_map(|(min_image_area, image_denylist, max_title_len, min, max)| ExtractionPolicy {
            min_image_area,
            image_denylist,
            max_title_len,
            // Whole cents round-trip exactly through JSON.
            min_price: f64::from(min) / 100.0,
            max_price: f64::from(max),
        })
}

fn arb_timing_settings() -> impl Strategy<Value = TimingSettings> {
    (1i64..3_600_000, 1i64..3_600_000, 1i64..3_600_000, 0i64..60_000).prop_map(
        |(auth_ttl_ms, dedup_check_ms, dedup_prune_ms, success_display_ms)| TimingSettings {
            auth_ttl_ms,
            dedup_check_ms,
            dedup_prune_ms,
            success_display_ms,
        },
    )
}

fn arb_clipper_settings() -> impl Strategy<Value = ClipperSettings> {
    (arb_api_settings(), arb_extraction_policy(), arb_timing_settings()).prop_map(
        |(api, extraction, timing)| ClipperSettings {
            api,
            extraction,
            timing,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn settings_json_roundtrip(settings in arb_clipper_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: ClipperSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn settings_file_roundtrip(settings in arb_clipper_settings()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
        let loaded = engine.load().unwrap();
        // The environment override is not set in tests, so the file wins.
        prop_assert_eq!(loaded, settings);
    }
}
