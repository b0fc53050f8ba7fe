//! Recently submitted URLs.
//!
//! Entries are kept for the prune window and pruned on the next write. The
//! "already added" check uses the shorter check window, so a flagged page can
//! still be re-added on purpose.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::managers::ephemeral_store::StorageBackend;
use crate::types::errors::StoreError;
use crate::types::submission::RecentSubmissionRecord;

pub const RECENT_ITEMS_KEY: &str = "recentItems";

#[derive(Clone)]
pub struct DedupLedger {
    store: Arc<dyn StorageBackend>,
    check_ms: i64,
    prune_ms: i64,
}

impl DedupLedger {
    pub fn new(store: Arc<dyn StorageBackend>, check_ms: i64, prune_ms: i64) -> Self {
        Self {
            store,
            check_ms,
            prune_ms,
        }
    }

    /// All stored records, oldest first. A corrupt list reads as empty.
    pub async fn records(&self) -> Result<Vec<RecentSubmissionRecord>, StoreError> {
        let values = self.store.get(&[RECENT_ITEMS_KEY]).await?;
        Ok(values
            .get(RECENT_ITEMS_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default())
    }

    /// Prunes records older than the prune window, then appends `url` at `now`.
    pub async fn record(&self, url: &str, now: i64) -> Result<(), StoreError> {
        let mut records: Vec<RecentSubmissionRecord> = self
            .records()
            .await?
            .into_iter()
            .filter(|r| now - r.added_at < self.prune_ms)
            .collect();
        records.push(RecentSubmissionRecord {
            url: url.to_string(),
            added_at: now,
        });

        let mut entries = HashMap::new();
        entries.insert(RECENT_ITEMS_KEY.to_string(), serde_json::to_value(&records)?);
        self.store.set(entries).await
    }

    /// True when `url` was recorded less than the check window before `now`.
    ///
    /// Advisory only; a read failure answers `false`.
    pub async fn was_recently_added(&self, url: &str, now: i64) -> bool {
        match self.records().await {
            Ok(records) => records
                .iter()
                .any(|r| r.url == url && now - r.added_at < self.check_ms),
            Err(e) => {
                warn!(error = %e, "dedup ledger read failed");
                false
            }
        }
    }
}
