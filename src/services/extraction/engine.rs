//! Extraction Engine.
//!
//! Composes the title, image and price cascades into one [`ExtractedProduct`].
//! The engine never fails: a field whose extractor comes up empty, or panics,
//! is reported as empty and the other fields are still returned.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use super::document::PageDocument;
use super::rules::Cascade;
use super::{image, price, title};
use crate::types::product::ExtractedProduct;
use crate::types::settings::ExtractionPolicy;

/// Holds the three prebuilt field cascades.
#[derive(Debug)]
pub struct ExtractionEngine {
    title: Cascade,
    image: Cascade,
    price: Cascade,
}

impl ExtractionEngine {
    pub fn new(policy: &ExtractionPolicy) -> Self {
        Self {
            title: title::cascade(policy),
            image: image::cascade(policy),
            price: price::cascade(policy),
        }
    }

    /// Builds an engine from custom cascades, e.g. site-specific rule sets.
    pub fn with_cascades(title: Cascade, image: Cascade, price: Cascade) -> Self {
        Self { title, image, price }
    }

    /// Extracts a product from an already parsed document.
    pub fn extract(&self, doc: &PageDocument) -> ExtractedProduct {
        let product = ExtractedProduct {
            title: guarded(&self.title, doc),
            image: guarded(&self.image, doc),
            price: guarded(&self.price, doc),
            url: doc.url().to_string(),
            domain: doc.domain(),
        };
        debug!(
            url = %product.url,
            has_title = !product.title.is_empty(),
            has_image = !product.image.is_empty(),
            has_price = !product.price.is_empty(),
            "extraction finished"
        );
        product
    }

    /// Parses `html` served at `url` and extracts a product from it.
    pub fn extract_html(&self, url: &str, html: &str) -> ExtractedProduct {
        let doc = PageDocument::parse(url, html);
        self.extract(&doc)
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new(&ExtractionPolicy::default())
    }
}

/// Evaluates one cascade, converting a panic into an absent field.
fn guarded(cascade: &Cascade, doc: &PageDocument) -> String {
    match panic::catch_unwind(AssertUnwindSafe(|| cascade.evaluate(doc))) {
        Ok(value) => value.unwrap_or_default(),
        Err(_) => {
            warn!(field = cascade.field(), "field extractor panicked; treating as absent");
            String::new()
        }
    }
}
