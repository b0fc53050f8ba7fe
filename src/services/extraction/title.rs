//! Product title cascade.
//!
//! Marketplace title nodes first, then class-name patterns, then `og:title`,
//! then any `h1`, and finally the document title minus its site suffix.

use std::sync::Arc;

use scraper::Selector;

use super::document::{element_text, non_empty_attr, PageDocument};
use super::rules::{Cascade, Rule};
use crate::types::settings::ExtractionPolicy;

/// Title selectors in priority order.
pub const TITLE_SELECTORS: &[&str] = &[
    // Marketplaces
    "#productTitle",
    "#title",
    "h1[data-test=\"product-title\"]",
    "[data-testid=\"product-title\"]",
    "h1[itemprop=\"name\"]",
    ".x-item-title__mainTitle",
    "h1[data-buy-box-listing-title]",
    ".sku-title h1",
    ".product-meta__title",
    // Generic patterns
    "[class*=\"product-title\"]",
    "[class*=\"productTitle\"]",
    "[class*=\"ProductTitle\"]",
    "[class*=\"product-name\"]",
    "[class*=\"productName\"]",
    "[class*=\"product_title\"]",
    // Metadata
    "meta[property=\"og:title\"]",
    "h1",
];

/// Builds the title cascade for `policy`.
pub fn cascade(policy: &ExtractionPolicy) -> Cascade {
    let policy = Arc::new(policy.clone());
    let selector_rules = TITLE_SELECTORS.iter().filter_map(|selector| {
        let policy = Arc::clone(&policy);
        Rule::for_selector(selector, move |doc, sel| read_title(doc, sel, &policy))
    });

    Cascade::new("title")
        .extend(selector_rules)
        .push(Rule::new("document.title", |doc| {
            Some(strip_site_suffix(&doc.title())).filter(|t| !t.is_empty())
        }))
}

/// Runs the default title cascade; empty string when nothing matched.
pub fn extract_title(doc: &PageDocument, policy: &ExtractionPolicy) -> String {
    cascade(policy).evaluate(doc).unwrap_or_default()
}

/// Reads the first element matching `sel`: `content` for meta tags, text otherwise.
fn read_title(doc: &PageDocument, sel: &Selector, policy: &ExtractionPolicy) -> Option<String> {
    let el = doc.select_first(sel)?;
    let text = if el.value().name() == "meta" {
        non_empty_attr(&el, "content")?.trim().to_string()
    } else {
        element_text(&el)
    };
    if text.is_empty() || text.chars().count() >= policy.max_title_len {
        return None;
    }
    Some(text)
}

/// Drops everything from the first `|` or `-` onward (`"Train | Shop"` → `"Train"`).
pub fn strip_site_suffix(title: &str) -> String {
    title
        .split(['|', '-'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
