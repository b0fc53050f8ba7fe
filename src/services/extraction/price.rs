//! Product price cascade.
//!
//! Marketplace price nodes first, then schema.org and class-name patterns,
//! and finally the first dollar amount in the page's visible text.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use scraper::Selector;

use super::document::{element_text, non_empty_attr, PageDocument};
use super::rules::{Cascade, Rule};
use crate::types::settings::ExtractionPolicy;

/// Price selectors in priority order.
pub const PRICE_SELECTORS: &[&str] = &[
    // Marketplaces
    "#corePrice_feature_div .a-offscreen",
    "#corePriceDisplay_desktop_feature_div .a-offscreen",
    "#priceblock_ourprice",
    "#priceblock_dealprice",
    "#price_inside_buybox",
    ".a-price .a-offscreen",
    "[data-test=\"product-price\"]",
    "[data-automation-id=\"product-price\"]",
    ".x-price-primary",
    "[data-buy-box-region=\"price\"] .wt-text-title-larger",
    ".priceView-customer-price span",
    // Structured metadata
    "meta[property=\"product:price:amount\"]",
    "meta[property=\"og:price:amount\"]",
    "[itemprop=\"price\"]",
    "[data-price]",
    // Generic patterns
    "[class*=\"product-price\"]",
    "[class*=\"productPrice\"]",
    "[class*=\"sale-price\"]",
    "[class*=\"current-price\"]",
    "[class*=\"price\"]",
    "[class*=\"Price\"]",
];

/// Digits and commas with an optional decimal remainder.
static AMOUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,]+(?:\.\d+)?").expect("amount pattern is valid"));

/// A dollar sign followed by an amount.
static DOLLAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*[\d,]+(?:\.\d{1,2})?").expect("dollar pattern is valid"));

/// Builds the price cascade for `policy`.
pub fn cascade(policy: &ExtractionPolicy) -> Cascade {
    let policy = Arc::new(policy.clone());
    let selector_rules = PRICE_SELECTORS.iter().filter_map(|selector| {
        let policy = Arc::clone(&policy);
        Rule::for_selector(selector, move |doc, sel| read_price(doc, sel, &policy))
    });

    let fallback_policy = Arc::clone(&policy);
    Cascade::new("price")
        .extend(selector_rules)
        .push(Rule::new("visible-text-dollar", move |doc| {
            let text = doc.visible_text();
            let found = DOLLAR_REGEX.find(&text)?;
            normalize_price(found.as_str(), &fallback_policy)
        }))
}

/// Runs the default price cascade; empty string when no amount qualified.
pub fn extract_price(doc: &PageDocument, policy: &ExtractionPolicy) -> String {
    cascade(policy).evaluate(doc).unwrap_or_default()
}

/// Parses the first amount in `raw` and formats it with two decimals.
///
/// Thousands separators are dropped. Values outside the policy's open range
/// `(min_price, max_price)` are rejected.
pub fn normalize_price(raw: &str, policy: &ExtractionPolicy) -> Option<String> {
    let matched = AMOUNT_REGEX.find(raw)?;
    let cleaned = matched.as_str().replace(',', "");
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() || value <= policy.min_price || value >= policy.max_price {
        return None;
    }
    Some(format!("{:.2}", value))
}

/// Tries every element matching `sel` until one carries an acceptable amount.
fn read_price(doc: &PageDocument, sel: &Selector, policy: &ExtractionPolicy) -> Option<String> {
    doc.select_all(sel).find_map(|el| {
        let meta_content = if el.value().name() == "meta" {
            non_empty_attr(&el, "content")
        } else {
            None
        };
        let raw = meta_content
            .or_else(|| non_empty_attr(&el, "data-price"))
            .or_else(|| non_empty_attr(&el, "content"))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| element_text(&el));
        normalize_price(&raw, policy)
    })
}
