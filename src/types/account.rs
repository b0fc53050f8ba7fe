use serde::{Deserialize, Serialize};

/// Account snapshot returned by the "who am I" endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub kids: Vec<KidProfile>,
    #[serde(default)]
    pub registries: Vec<Registry>,
}

impl AuthPayload {
    pub fn has_kid(&self, id: &str) -> bool {
        self.kids.iter().any(|k| k.id == id)
    }

    pub fn has_registry(&self, id: &str) -> bool {
        self.registries.iter().any(|r| r.id == id)
    }

    pub fn kid(&self, id: &str) -> Option<&KidProfile> {
        self.kids.iter().find(|k| k.id == id)
    }
}

/// A child profile that owns a wishlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KidProfile {
    pub id: String,
    pub name: String,
}

/// A gift registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

/// Account snapshot plus the time it was fetched (Unix millis).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedAuthSnapshot {
    pub payload: AuthPayload,
    pub fetched_at: i64,
}

impl CachedAuthSnapshot {
    /// True while `now - fetched_at < ttl_ms`.
    pub fn is_fresh(&self, now: i64, ttl_ms: i64) -> bool {
        now - self.fetched_at < ttl_ms
    }
}
