//! App Core for Wishclip.
//!
//! Composition root: owns the settings, the storage backend and the shared
//! engines, and builds one [`SubmissionController`] per popup activation.

use std::sync::Arc;

use tracing::info;

use crate::database::connection::Database;
use crate::managers::auth_cache::AuthCache;
use crate::managers::dedup_ledger::DedupLedger;
use crate::managers::ephemeral_store::{SqliteStore, StorageBackend};
use crate::managers::preference_store::PreferenceStore;
use crate::managers::submission_controller::{ControllerDeps, SubmissionController};
use crate::services::clock::{Clock, SystemClock};
use crate::services::extraction::ExtractionEngine;
use crate::services::page_source::PageSource;
use crate::services::session_resolver::{CookieSource, SessionResolver};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::wishlist_api::{HttpWishlistApi, WishlistApi};
use crate::types::errors::ApiError;

pub struct App {
    pub settings_engine: SettingsEngine,
    pub store: Arc<dyn StorageBackend>,
    pub clock: Arc<dyn Clock>,
    engine: Arc<ExtractionEngine>,
    /// Fixed API client; `None` builds an HTTP client from the current settings.
    api_override: Option<Arc<dyn WishlistApi>>,
    controller: Option<SubmissionController>,
}

impl App {
    /// Opens the SQLite store at `db_path` and loads settings from the default path.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        let mut settings_engine = SettingsEngine::new(None);
        settings_engine.load()?;
        info!(db = db_path, config = settings_engine.get_config_path(), "app initialised");

        Ok(Self::with_parts(
            settings_engine,
            Arc::new(SqliteStore::new(db)),
            None,
            Arc::new(SystemClock),
        ))
    }

    /// Assembles an app from explicit parts. `settings_engine` should already be loaded.
    pub fn with_parts(
        settings_engine: SettingsEngine,
        store: Arc<dyn StorageBackend>,
        api: Option<Arc<dyn WishlistApi>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = Arc::new(ExtractionEngine::new(&settings_engine.get_settings().extraction));
        Self {
            settings_engine,
            store,
            clock,
            engine,
            api_override: api,
            controller: None,
        }
    }

    pub fn engine(&self) -> &ExtractionEngine {
        &self.engine
    }

    /// Rebuilds the extraction engine after a settings change.
    pub fn apply_settings(&mut self) {
        self.engine = Arc::new(ExtractionEngine::new(
            &self.settings_engine.get_settings().extraction,
        ));
    }

    fn api(&self) -> Result<Arc<dyn WishlistApi>, ApiError> {
        match &self.api_override {
            Some(api) => Ok(Arc::clone(api)),
            None => Ok(Arc::new(HttpWishlistApi::new(
                &self.settings_engine.get_settings().api,
            )?)),
        }
    }

    /// Starts a popup activation for `page` and returns its controller.
    pub async fn open_popup(
        &mut self,
        page: Arc<dyn PageSource>,
        cookies: Arc<dyn CookieSource>,
    ) -> Result<&mut SubmissionController, ApiError> {
        let settings = self.settings_engine.get_settings().clone();
        let deps = ControllerDeps {
            resolver: SessionResolver::new(cookies, settings.api.cookie_domain.clone()),
            api: self.api()?,
            page,
            engine: Arc::clone(&self.engine),
            auth_cache: AuthCache::new(Arc::clone(&self.store), settings.timing.auth_ttl_ms),
            dedup: DedupLedger::new(
                Arc::clone(&self.store),
                settings.timing.dedup_check_ms,
                settings.timing.dedup_prune_ms,
            ),
            prefs: PreferenceStore::new(Arc::clone(&self.store)),
            clock: Arc::clone(&self.clock),
            timing: settings.timing,
        };

        let controller = self.controller.insert(SubmissionController::new(deps));
        controller.open().await;
        Ok(controller)
    }

    /// The controller of the current activation, if a popup was opened.
    pub fn controller(&mut self) -> Option<&mut SubmissionController> {
        self.controller.as_mut()
    }
}
