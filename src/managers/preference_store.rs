//! Persisted popup selection.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::managers::ephemeral_store::StorageBackend;
use crate::types::errors::StoreError;
use crate::types::submission::{DestinationMode, UserPreferences};

pub const LAST_KID_KEY: &str = "lastKidId";
pub const LAST_REGISTRY_KEY: &str = "lastRegistryId";
pub const LAST_DESTINATION_KEY: &str = "lastDestination";

#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn StorageBackend>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<UserPreferences, StoreError> {
        let values = self
            .store
            .get(&[LAST_KID_KEY, LAST_REGISTRY_KEY, LAST_DESTINATION_KEY])
            .await?;
        let text = |key: &str| {
            values
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(UserPreferences {
            last_kid_id: text(LAST_KID_KEY),
            last_registry_id: text(LAST_REGISTRY_KEY),
            last_destination: text(LAST_DESTINATION_KEY).and_then(|s| DestinationMode::parse(&s)),
        })
    }

    /// Writes the fields that are set; `None` fields keep their stored value.
    pub async fn save(&self, prefs: &UserPreferences) -> Result<(), StoreError> {
        let mut entries = HashMap::new();
        if let Some(id) = &prefs.last_kid_id {
            entries.insert(LAST_KID_KEY.to_string(), Value::String(id.clone()));
        }
        if let Some(id) = &prefs.last_registry_id {
            entries.insert(LAST_REGISTRY_KEY.to_string(), Value::String(id.clone()));
        }
        if let Some(mode) = prefs.last_destination {
            entries.insert(
                LAST_DESTINATION_KEY.to_string(),
                Value::String(mode.as_str().to_string()),
            );
        }
        if entries.is_empty() {
            return Ok(());
        }
        self.store.set(entries).await
    }
}
