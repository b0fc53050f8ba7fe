//! Submission Controller.
//!
//! Drives one popup activation: decides which screen to show, runs the
//! extraction engine in the active tab, and submits the product to the
//! wishlist service. All screen data lives in one [`PopupState`] value that
//! is replaced, never edited, on each transition.
//!
//! Activation order:
//! 1. read the cached account snapshot (fast paint when fresh),
//! 2. resolve the session token; none means `NotLoggedIn`,
//! 3. without a usable cache, fetch the account; failure means `NotLoggedIn`,
//! 4. no child profiles means `NoProfiles`,
//! 5. restore the saved selection and extract from the tab,
//! 6. restricted tabs and title-less extractions mean `ExtractionFailed`,
//! 7. otherwise `Ready`, flagged when the URL is in the dedup window.
//!
//! When the cache was used, a refresh of the snapshot runs as a detached
//! task after the cached data is applied. Its result only updates the cache.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::managers::auth_cache::AuthCache;
use crate::managers::dedup_ledger::DedupLedger;
use crate::managers::preference_store::PreferenceStore;
use crate::services::clock::Clock;
use crate::services::extraction::ExtractionEngine;
use crate::services::page_source::{is_restricted_url, PageSource};
use crate::services::session_resolver::SessionResolver;
use crate::services::wishlist_api::WishlistApi;
use crate::types::account::AuthPayload;
use crate::types::errors::{ApiError, SubmitError};
use crate::types::popup::{ActionControl, Phase, PopupState};
use crate::types::settings::TimingSettings;
use crate::types::submission::{AddItemRequest, AddItemResponse, DestinationMode, UserPreferences};

pub const GENERIC_FAILURE: &str = "Failed to add item. Please try again.";
pub const TIMEOUT_FAILURE: &str = "The request timed out. Please try again.";

/// Collaborators of one controller.
pub struct ControllerDeps {
    pub resolver: SessionResolver,
    pub api: Arc<dyn WishlistApi>,
    pub page: Arc<dyn PageSource>,
    pub engine: Arc<ExtractionEngine>,
    pub auth_cache: AuthCache,
    pub dedup: DedupLedger,
    pub prefs: PreferenceStore,
    pub clock: Arc<dyn Clock>,
    pub timing: TimingSettings,
}

/// An add-item call that has left the controller.
pub struct PendingSubmit {
    api: Arc<dyn WishlistApi>,
    token: String,
    request: AddItemRequest,
    destination: DestinationMode,
    target: String,
}

impl PendingSubmit {
    pub async fn send(&self) -> Result<AddItemResponse, ApiError> {
        self.api.add_item(&self.token, &self.request).await
    }
}

pub struct SubmissionController {
    deps: ControllerDeps,
    state: PopupState,
    token: Option<String>,
    refresh: Option<JoinHandle<()>>,
}

impl SubmissionController {
    pub fn new(deps: ControllerDeps) -> Self {
        Self {
            deps,
            state: PopupState::loading(),
            token: None,
            refresh: None,
        }
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    /// Handle of the background snapshot refresh, if one was started.
    pub fn take_refresh_handle(&mut self) -> Option<JoinHandle<()>> {
        self.refresh.take()
    }

    fn transition(&mut self, next: impl FnOnce(PopupState) -> PopupState) {
        let current = std::mem::take(&mut self.state);
        self.state = next(current);
    }

    /// Runs the activation flow and returns the resulting state.
    pub async fn open(&mut self) -> &PopupState {
        self.state = PopupState::loading();
        self.token = None;

        let now = self.deps.clock.now_millis();
        let cached = self
            .deps
            .auth_cache
            .load(now)
            .await
            .filter(|p| p.is_logged_in);

        let Some(token) = self.deps.resolver.resolve().await else {
            if let Err(e) = self.deps.auth_cache.invalidate().await {
                warn!(error = %e, "failed to clear cached auth");
            }
            info!("no session cookie; not logged in");
            self.transition(|s| s.enter(Phase::NotLoggedIn));
            return &self.state;
        };
        self.token = Some(token.clone());

        let (account, from_cache) = match cached {
            Some(payload) => (payload, true),
            None => match self.fetch_account(&token).await {
                Some(payload) => (payload, false),
                None => {
                    self.transition(|s| s.enter(Phase::NotLoggedIn));
                    return &self.state;
                }
            },
        };

        self.transition(|s| s.with_account(account.clone(), from_cache));
        if from_cache {
            self.spawn_refresh(token);
        }

        if account.kids.is_empty() {
            info!("account has no child profiles");
            self.transition(|s| s.enter(Phase::NoProfiles));
            return &self.state;
        }

        let prefs = match self.deps.prefs.load().await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(error = %e, "failed to read preferences");
                UserPreferences::default()
            }
        };
        let (destination, kid, registry) = initial_selection(&account, &prefs);
        self.transition(|s| s.with_selection(destination, kid, registry));

        let product = match self.deps.page.active_url().await {
            Ok(url) if is_restricted_url(&url) => {
                info!(url = %url, "restricted page; extraction skipped");
                None
            }
            Ok(_) => match self.deps.page.inject(&self.deps.engine).await {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "extraction injection failed");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "no active tab");
                None
            }
        };

        let Some(product) = product.filter(|p| p.has_title()) else {
            self.transition(|s| s.enter(Phase::ExtractionFailed));
            return &self.state;
        };

        let already_added = self
            .deps
            .dedup
            .was_recently_added(&product.url, self.deps.clock.now_millis())
            .await;
        info!(domain = %product.domain, already_added, "product ready");
        self.transition(|s| s.ready(product, already_added));
        &self.state
    }

    /// Fetches and caches the account; any failure reads as logged out.
    async fn fetch_account(&self, token: &str) -> Option<AuthPayload> {
        match self.deps.api.who_am_i(token).await {
            Ok(payload) if payload.is_logged_in => {
                let fetched_at = self.deps.clock.now_millis();
                if let Err(e) = self.deps.auth_cache.store(&payload, fetched_at).await {
                    warn!(error = %e, "failed to cache account snapshot");
                }
                Some(payload)
            }
            Ok(_) => {
                info!("auth endpoint reports logged out");
                None
            }
            Err(e) => {
                warn!(error = %e, "auth check failed; treating as logged out");
                None
            }
        }
    }

    fn spawn_refresh(&mut self, token: String) {
        let api = Arc::clone(&self.deps.api);
        let cache = self.deps.auth_cache.clone();
        let clock = Arc::clone(&self.deps.clock);

        self.refresh = Some(tokio::spawn(async move {
            match api.who_am_i(&token).await {
                Ok(payload) if payload.is_logged_in => {
                    if let Err(e) = cache.store(&payload, clock.now_millis()).await {
                        debug!(error = %e, "background refresh could not update cache");
                    } else {
                        debug!("background refresh updated cached account");
                    }
                }
                Ok(_) => debug!("background refresh reported logged out; cache kept"),
                Err(e) => debug!(error = %e, "background refresh failed; cache kept"),
            }
        }));
    }

    /// Selects a child profile. Unknown ids are ignored.
    pub async fn select_kid(&mut self, id: &str) -> &PopupState {
        let known = self
            .state
            .account
            .as_ref()
            .is_some_and(|a| a.has_kid(id));
        if !known {
            warn!(id, "ignoring unknown child profile");
            return &self.state;
        }
        let id = id.to_string();
        self.transition(|s| s.select_kid(Some(id.clone())));
        self.persist(UserPreferences {
            last_kid_id: Some(id),
            ..UserPreferences::default()
        })
        .await;
        &self.state
    }

    /// Selects a registry. Unknown ids are ignored.
    pub async fn select_registry(&mut self, id: &str) -> &PopupState {
        let known = self
            .state
            .account
            .as_ref()
            .is_some_and(|a| a.has_registry(id));
        if !known {
            warn!(id, "ignoring unknown registry");
            return &self.state;
        }
        let id = id.to_string();
        self.transition(|s| s.select_registry(Some(id.clone())));
        self.persist(UserPreferences {
            last_registry_id: Some(id),
            ..UserPreferences::default()
        })
        .await;
        &self.state
    }

    /// Switches destination mode; clears any shown message.
    pub async fn set_destination(&mut self, mode: DestinationMode) -> &PopupState {
        self.transition(|s| s.switch_destination(mode));
        self.persist(UserPreferences {
            last_destination: Some(mode),
            ..UserPreferences::default()
        })
        .await;
        &self.state
    }

    /// Reverts an expired success indicator.
    pub fn settle(&mut self) -> &PopupState {
        let now = self.deps.clock.now_millis();
        self.transition(|s| s.settle(now));
        &self.state
    }

    /// Submits the displayed product to the selected target.
    ///
    /// Local rejections (wrong phase, nothing selected) make no network call.
    /// A remote failure is shown in the state's notice and also returned.
    pub async fn submit(&mut self) -> Result<&PopupState, SubmitError> {
        let pending = self.begin_submit()?;
        let result = pending.send().await;
        self.finish_submit(pending, result).await
    }

    /// Validates the submission and moves the action control to `Submitting`.
    ///
    /// The returned request is sent with [`PendingSubmit::send`] and its
    /// outcome applied with [`finish_submit`](Self::finish_submit), so a host
    /// can release its own lock while the call is in flight.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SubmitError> {
        self.settle();

        if self.state.phase != Phase::Ready {
            return Err(SubmitError::NotReady);
        }
        if self.state.action == ActionControl::Submitting {
            return Err(SubmitError::InProgress);
        }
        let (Some(product), Some(token)) = (self.state.product.clone(), self.token.clone()) else {
            return Err(SubmitError::NotReady);
        };

        let destination = self.state.destination;
        let Some(target) = self.state.selected_target().map(str::to_string) else {
            let err = SubmitError::MissingSelection(destination.selection_label());
            let message = err.to_string();
            self.transition(|s| s.failed(message));
            return Err(err);
        };

        let request = AddItemRequest {
            kid_id: (destination == DestinationMode::Kid).then(|| target.clone()),
            registry_id: (destination == DestinationMode::Registry).then(|| target.clone()),
            title: product.title,
            image: product.image,
            price: product.price,
            url: product.url,
        };

        self.transition(PopupState::submitting);
        info!(destination = destination.as_str(), url = %request.url, "submitting item");

        Ok(PendingSubmit {
            api: Arc::clone(&self.deps.api),
            token,
            request,
            destination,
            target,
        })
    }

    /// Applies the outcome of a submission started by [`begin_submit`](Self::begin_submit).
    ///
    /// A successful add is always recorded in the dedup ledger. The popup
    /// state only changes while it still shows that submission in flight.
    pub async fn finish_submit(
        &mut self,
        pending: PendingSubmit,
        result: Result<AddItemResponse, ApiError>,
    ) -> Result<&PopupState, SubmitError> {
        let PendingSubmit { request, destination, target, .. } = pending;
        let in_flight = self.state.action == ActionControl::Submitting
            && self
                .state
                .product
                .as_ref()
                .is_some_and(|p| p.url == request.url);

        match result {
            Ok(response) => {
                let now = self.deps.clock.now_millis();
                if let Err(e) = self.deps.dedup.record(&request.url, now).await {
                    warn!(error = %e, "failed to record submission");
                }
                if !in_flight {
                    info!(url = %request.url, "submission finished after the popup moved on");
                    return Ok(&self.state);
                }
                self.persist(UserPreferences {
                    last_kid_id: self.state.selected_kid.clone(),
                    last_registry_id: self.state.selected_registry.clone(),
                    last_destination: Some(destination),
                })
                .await;

                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| self.success_message(destination, &target));
                let until = now + self.deps.timing.success_display_ms;
                self.transition(|s| s.succeeded(message, until));
                Ok(&self.state)
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                if in_flight {
                    let message = failure_message(&e);
                    self.transition(|s| s.failed(message));
                }
                Err(SubmitError::Api(e))
            }
        }
    }

    /// Drops the cached account and returns to the logged-out screen.
    pub async fn logout(&mut self) -> &PopupState {
        if let Err(e) = self.deps.auth_cache.invalidate().await {
            warn!(error = %e, "failed to clear cached auth");
        }
        if let Some(handle) = self.refresh.take() {
            handle.abort();
        }
        self.token = None;
        self.state = PopupState::loading().enter(Phase::NotLoggedIn);
        info!("logged out");
        &self.state
    }

    fn success_message(&self, destination: DestinationMode, target: &str) -> String {
        let account = self.state.account.as_ref();
        match destination {
            DestinationMode::Kid => match account.and_then(|a| a.kid(target)) {
                Some(kid) => format!("Added to {}'s wishlist!", kid.name),
                None => "Added to wishlist!".to_string(),
            },
            DestinationMode::Registry => {
                match account.and_then(|a| a.registries.iter().find(|r| r.id == target)) {
                    Some(registry) => format!("Added to {}!", registry.name),
                    None => "Added to registry!".to_string(),
                }
            }
        }
    }

    async fn persist(&self, prefs: UserPreferences) {
        if let Err(e) = self.deps.prefs.save(&prefs).await {
            warn!(error = %e, "failed to save preferences");
        }
    }
}

/// Saved selection where it still exists, else the first entry of each list.
fn initial_selection(
    account: &AuthPayload,
    prefs: &UserPreferences,
) -> (DestinationMode, Option<String>, Option<String>) {
    let kid = prefs
        .last_kid_id
        .clone()
        .filter(|id| account.has_kid(id))
        .or_else(|| account.kids.first().map(|k| k.id.clone()));
    let registry = prefs
        .last_registry_id
        .clone()
        .filter(|id| account.has_registry(id))
        .or_else(|| account.registries.first().map(|r| r.id.clone()));

    let destination = match prefs.last_destination.unwrap_or_default() {
        DestinationMode::Registry if account.registries.is_empty() => DestinationMode::Kid,
        mode => mode,
    };
    (destination, kid, registry)
}

fn failure_message(err: &ApiError) -> String {
    match err {
        ApiError::TimedOut => TIMEOUT_FAILURE.to_string(),
        _ => err
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
    }
}
