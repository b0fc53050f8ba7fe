//! Heuristic product-metadata extraction.
//!
//! Each field (title, image, price) is an ordered [`rules::Cascade`] of
//! pure document rules; the [`engine::ExtractionEngine`] runs all three and
//! assembles a serializable [`crate::types::product::ExtractedProduct`].

pub mod document;
pub mod engine;
pub mod image;
pub mod price;
pub mod rules;
pub mod title;

pub use document::PageDocument;
pub use engine::ExtractionEngine;
