use serde::{Deserialize, Serialize};

/// Best-effort product record produced by one extraction run.
///
/// Every field may be empty; an empty field means "not found", never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedProduct {
    pub title: String,
    /// Absolute image URL (or `data:image` URI).
    pub image: String,
    /// Decimal string with exactly two fraction digits, e.g. `"1299.50"`.
    pub price: String,
    pub url: String,
    pub domain: String,
}

impl ExtractedProduct {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
