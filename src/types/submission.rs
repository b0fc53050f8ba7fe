use serde::{Deserialize, Serialize};

/// One entry of the recent-submissions ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecentSubmissionRecord {
    pub url: String,
    pub added_at: i64,
}

/// Which of the two mutually exclusive targets a submission goes to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DestinationMode {
    #[default]
    Kid,
    Registry,
}

impl DestinationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationMode::Kid => "kid",
            DestinationMode::Registry => "registry",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kid" | "wishlist" => Some(DestinationMode::Kid),
            "registry" => Some(DestinationMode::Registry),
            _ => None,
        }
    }

    /// Human label for the selection this mode requires.
    pub fn selection_label(&self) -> &'static str {
        match self {
            DestinationMode::Kid => "child",
            DestinationMode::Registry => "registry",
        }
    }
}

/// Last UI selection, restored on the next popup activation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPreferences {
    pub last_kid_id: Option<String>,
    pub last_registry_id: Option<String>,
    pub last_destination: Option<DestinationMode>,
}

/// Body of `POST /wishlist/add-external`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<String>,
    pub title: String,
    pub image: String,
    pub price: String,
    pub url: String,
}

/// Success body of `POST /wishlist/add-external`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AddItemResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub item: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}
