use thiserror::Error;

// === StoreError ===

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("Store database error: {0}")]
    DatabaseError(String),
    /// A stored value could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    SerializationError(String),
    /// The backend lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

// === ApiError ===

/// Errors from the remote wishlist service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    TimedOut,
    /// The request could not be sent or the connection dropped.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The server answered with a non-success status.
    #[error("Request rejected with status {status}")]
    Rejected {
        status: u16,
        /// Server-provided error message, if the body carried one.
        message: Option<String>,
    },
    /// The response body was not the expected JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// Returns the server's own message when it supplied one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message: Some(msg), .. } if !msg.trim().is_empty() => Some(msg),
            _ => None,
        }
    }
}

// === CookieError ===

/// Errors reading the browser cookie jar.
#[derive(Debug, Error)]
pub enum CookieError {
    /// The cookie jar could not be read.
    #[error("Cookie jar unavailable: {0}")]
    Unavailable(String),
}

// === PageError ===

/// Errors talking to the active browser tab.
#[derive(Debug, Error)]
pub enum PageError {
    /// There is no active tab to inspect.
    #[error("No active tab")]
    NoActiveTab,
    /// The tab's URL scheme does not allow script injection.
    #[error("Restricted page: {0}")]
    Restricted(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === SubmitError ===

/// Errors from an add-item attempt.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The controller is not in a state that accepts submissions.
    #[error("Not ready to submit")]
    NotReady,
    /// A submission is already in flight.
    #[error("Submission already in progress")]
    InProgress,
    /// The active destination mode has no selected target.
    #[error("No {0} selected")]
    MissingSelection(&'static str),
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
