//! Cached account snapshot used for fast paint.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::managers::ephemeral_store::StorageBackend;
use crate::types::account::{AuthPayload, CachedAuthSnapshot};
use crate::types::errors::StoreError;

pub const CACHED_AUTH_KEY: &str = "cachedAuth";
pub const CACHED_AUTH_TIME_KEY: &str = "cachedAuthTime";

/// Repository for the last-known [`AuthPayload`].
#[derive(Clone)]
pub struct AuthCache {
    store: Arc<dyn StorageBackend>,
    ttl_ms: i64,
}

impl AuthCache {
    pub fn new(store: Arc<dyn StorageBackend>, ttl_ms: i64) -> Self {
        Self { store, ttl_ms }
    }

    /// The cached snapshot, regardless of age.
    pub async fn snapshot(&self) -> Result<Option<CachedAuthSnapshot>, StoreError> {
        let values = self.store.get(&[CACHED_AUTH_KEY, CACHED_AUTH_TIME_KEY]).await?;
        let (Some(payload), Some(fetched_at)) = (
            values.get(CACHED_AUTH_KEY),
            values.get(CACHED_AUTH_TIME_KEY).and_then(Value::as_i64),
        ) else {
            return Ok(None);
        };

        match serde_json::from_value::<AuthPayload>(payload.clone()) {
            Ok(payload) => Ok(Some(CachedAuthSnapshot { payload, fetched_at })),
            Err(e) => {
                warn!(error = %e, "discarding undecodable cached auth payload");
                Ok(None)
            }
        }
    }

    /// The cached payload when it is younger than the TTL at `now`.
    pub async fn load(&self, now: i64) -> Option<AuthPayload> {
        match self.snapshot().await {
            Ok(Some(snapshot)) if snapshot.is_fresh(now, self.ttl_ms) => Some(snapshot.payload),
            Ok(Some(snapshot)) => {
                debug!(age_ms = now - snapshot.fetched_at, "cached auth expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "auth cache read failed");
                None
            }
        }
    }

    /// Replaces the cached snapshot.
    pub async fn store(&self, payload: &AuthPayload, fetched_at: i64) -> Result<(), StoreError> {
        let mut entries = HashMap::new();
        entries.insert(CACHED_AUTH_KEY.to_string(), serde_json::to_value(payload)?);
        entries.insert(CACHED_AUTH_TIME_KEY.to_string(), json!(fetched_at));
        self.store.set(entries).await
    }

    pub async fn invalidate(&self) -> Result<(), StoreError> {
        self.store.remove(&[CACHED_AUTH_KEY, CACHED_AUTH_TIME_KEY]).await
    }
}
