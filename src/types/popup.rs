use serde::Serialize;

use super::account::AuthPayload;
use super::product::ExtractedProduct;
use super::submission::DestinationMode;

/// Top-level screen the popup presents.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    NotLoggedIn,
    NoProfiles,
    ExtractionFailed,
    Ready,
}

impl Phase {
    /// Terminal phases end the activation; only `Ready` accepts input.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Phase::NotLoggedIn | Phase::NoProfiles | Phase::ExtractionFailed
        )
    }
}

/// State of the "add" button while in `Ready`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionControl {
    Idle,
    Submitting,
    /// Success indicator shown until the given Unix-millis instant.
    Confirmed { until: i64 },
}

/// Message line under the action control.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Everything the popup renders, as one immutable value.
///
/// Transitions consume the current value and return the next one, so the
/// controller never mutates fields piecemeal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PopupState {
    pub phase: Phase,
    pub account: Option<AuthPayload>,
    pub product: Option<ExtractedProduct>,
    pub destination: DestinationMode,
    pub selected_kid: Option<String>,
    pub selected_registry: Option<String>,
    pub action: ActionControl,
    pub notice: Option<Notice>,
    /// The current URL was submitted within the dedup window.
    pub already_added: bool,
    /// The account data on screen came from the local cache.
    pub from_cache: bool,
}

impl Default for PopupState {
    fn default() -> Self {
        Self::loading()
    }
}

impl PopupState {
    pub fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            account: None,
            product: None,
            destination: DestinationMode::Kid,
            selected_kid: None,
            selected_registry: None,
            action: ActionControl::Idle,
            notice: None,
            already_added: false,
            from_cache: false,
        }
    }

    pub fn enter(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    pub fn with_account(self, account: AuthPayload, from_cache: bool) -> Self {
        Self {
            account: Some(account),
            from_cache,
            ..self
        }
    }

    pub fn with_selection(
        self,
        destination: DestinationMode,
        selected_kid: Option<String>,
        selected_registry: Option<String>,
    ) -> Self {
        Self {
            destination,
            selected_kid,
            selected_registry,
            ..self
        }
    }

    pub fn ready(self, product: ExtractedProduct, already_added: bool) -> Self {
        Self {
            phase: Phase::Ready,
            product: Some(product),
            already_added,
            ..self
        }
    }

    /// Switches destination mode and clears any success/error message.
    pub fn switch_destination(self, destination: DestinationMode) -> Self {
        Self {
            destination,
            notice: None,
            ..self
        }
    }

    pub fn select_kid(self, id: Option<String>) -> Self {
        Self {
            selected_kid: id,
            ..self
        }
    }

    pub fn select_registry(self, id: Option<String>) -> Self {
        Self {
            selected_registry: id,
            ..self
        }
    }

    pub fn submitting(self) -> Self {
        Self {
            action: ActionControl::Submitting,
            notice: None,
            ..self
        }
    }

    pub fn succeeded(self, message: String, until: i64) -> Self {
        Self {
            action: ActionControl::Confirmed { until },
            notice: Some(Notice::Success(message)),
            already_added: true,
            ..self
        }
    }

    pub fn failed(self, message: String) -> Self {
        Self {
            action: ActionControl::Idle,
            notice: Some(Notice::Error(message)),
            ..self
        }
    }

    /// Reverts an expired success indicator to the idle label.
    pub fn settle(self, now: i64) -> Self {
        match self.action {
            ActionControl::Confirmed { until } if now >= until => Self {
                action: ActionControl::Idle,
                ..self
            },
            _ => self,
        }
    }

    /// The target id the current destination mode requires.
    pub fn selected_target(&self) -> Option<&str> {
        match self.destination {
            DestinationMode::Kid => self.selected_kid.as_deref(),
            DestinationMode::Registry => self.selected_registry.as_deref(),
        }
    }

    pub fn action_enabled(&self) -> bool {
        self.phase == Phase::Ready
            && self.action != ActionControl::Submitting
            && self.selected_target().is_some()
    }

    pub fn action_label(&self) -> &'static str {
        match (self.action, self.destination) {
            (ActionControl::Submitting, _) => "Adding...",
            (ActionControl::Confirmed { .. }, _) => "Added!",
            (ActionControl::Idle, DestinationMode::Kid) => "Add to Wishlist",
            (ActionControl::Idle, DestinationMode::Registry) => "Add to Registry",
        }
    }
}
