use serde::{Deserialize, Serialize};

/// Top-level settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClipperSettings {
    pub api: ApiSettings,
    pub extraction: ExtractionPolicy,
    pub timing: TimingSettings,
}

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    /// Base URL of the wishlist API, without a trailing slash.
    pub base_url: String,
    /// Domain whose cookies carry the session credential.
    pub cookie_domain: String,
    /// Upper bound for every network call.
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://wishclip.app/api".to_string(),
            cookie_domain: "wishclip.app".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Tunable constants of the extraction heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionPolicy {
    /// Minimum `width * height` (exclusive) for the largest-image fallback.
    pub min_image_area: u64,
    /// Case-insensitive substrings that disqualify an image URL.
    pub image_denylist: Vec<String>,
    /// Titles must be strictly shorter than this many characters.
    pub max_title_len: usize,
    /// Accepted prices are strictly between these bounds.
    pub min_price: f64,
    pub max_price: f64,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            min_image_area: 10_000,
            image_denylist: [
                "pixel",
                "spacer",
                "1x1",
                "blank",
                "transparent",
                "icon",
                "logo",
                "sprite",
                "button",
                "badge",
                "tracking",
                "beacon",
                "analytics",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_title_len: 500,
            min_price: 0.0,
            max_price: 100_000.0,
        }
    }
}

/// Cache lifetimes and UI timings, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingSettings {
    pub auth_ttl_ms: i64,
    pub dedup_check_ms: i64,
    pub dedup_prune_ms: i64,
    #[serde(default = "default_success_display")]
    pub success_display_ms: i64,
}

fn default_success_display() -> i64 {
    2_000
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            auth_ttl_ms: 300_000,
            dedup_check_ms: 60_000,
            dedup_prune_ms: 300_000,
            success_display_ms: default_success_display(),
        }
    }
}
