//! Access to the active browser tab.
//!
//! The popup never touches a page directly: it asks a [`PageSource`] for the
//! active tab's URL and for the result of running the extraction engine in
//! that tab. [`HtmlSnapshot`] is the source used when the host hands over the
//! tab's serialized document.

use async_trait::async_trait;

use crate::services::extraction::ExtractionEngine;
use crate::types::errors::PageError;
use crate::types::product::ExtractedProduct;

/// URL prefixes of pages extensions may not inject into.
const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "chrome-search://",
    "chrome-untrusted://",
    "edge://",
    "brave://",
    "opera://",
    "vivaldi://",
    "about:",
    "moz-extension://",
    "devtools://",
    "view-source:",
    "https://chrome.google.com/webstore",
    "https://chromewebstore.google.com",
];

/// True for browser-internal and extension pages, where extraction is skipped.
pub fn is_restricted_url(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    RESTRICTED_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// The active tab, as seen from the popup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// URL of the active tab.
    async fn active_url(&self) -> Result<String, PageError>;

    /// Runs `engine` inside the active tab and returns its serializable result.
    async fn inject(&self, engine: &ExtractionEngine) -> Result<ExtractedProduct, PageError>;
}

/// A tab captured as URL + serialized HTML.
#[derive(Debug, Clone)]
pub struct HtmlSnapshot {
    url: String,
    html: String,
}

impl HtmlSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
impl PageSource for HtmlSnapshot {
    /// A snapshot without a URL stands for "no tab".
    async fn active_url(&self) -> Result<String, PageError> {
        if self.url.trim().is_empty() {
            return Err(PageError::NoActiveTab);
        }
        Ok(self.url.clone())
    }

    async fn inject(&self, engine: &ExtractionEngine) -> Result<ExtractedProduct, PageError> {
        if is_restricted_url(&self.url) {
            return Err(PageError::Restricted(self.url.clone()));
        }
        Ok(engine.extract_html(&self.url, &self.html))
    }
}
