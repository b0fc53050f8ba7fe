//! Client for the remote wishlist service.
//!
//! Two calls are consumed: `GET /auth` ("who am I") and
//! `POST /wishlist/add-external`. Both carry the bearer token resolved from
//! the browser's cookies, and both are bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::account::AuthPayload;
use crate::types::errors::ApiError;
use crate::types::settings::ApiSettings;
use crate::types::submission::{AddItemRequest, AddItemResponse};

/// Operations the popup needs from the wishlist service.
#[async_trait]
pub trait WishlistApi: Send + Sync {
    /// Fetches the account snapshot for `token`.
    async fn who_am_i(&self, token: &str) -> Result<AuthPayload, ApiError>;

    /// Adds one externally sourced item to a wishlist or registry.
    async fn add_item(&self, token: &str, request: &AddItemRequest) -> Result<AddItemResponse, ApiError>;
}

/// Error body shape: `{ "error": "..." }`, sometimes `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// reqwest-backed [`WishlistApi`].
pub struct HttpWishlistApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpWishlistApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| ApiError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::TimedOut
    } else {
        ApiError::NetworkError(err.to_string())
    }
}

/// Turns a non-success response into `ApiError::Rejected`, keeping the server's message.
async fn rejection(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .filter(|m| !m.trim().is_empty());
    ApiError::Rejected { status, message }
}

#[async_trait]
impl WishlistApi for HttpWishlistApi {
    async fn who_am_i(&self, token: &str) -> Result<AuthPayload, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/auth"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            debug!(error = %err, "auth check rejected");
            return Err(err);
        }

        response
            .json::<AuthPayload>()
            .await
            .map_err(|e| if e.is_timeout() { ApiError::TimedOut } else { ApiError::MalformedResponse(e.to_string()) })
    }

    async fn add_item(&self, token: &str, request: &AddItemRequest) -> Result<AddItemResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/wishlist/add-external"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            warn!(error = %err, url = %request.url, "add item rejected");
            return Err(err);
        }

        // Some deployments answer 201 with an empty body.
        let text = response.text().await.map_err(map_send_error)?;
        if text.trim().is_empty() {
            return Ok(AddItemResponse {
                success: true,
                ..AddItemResponse::default()
            });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}
