//! Product image cascade.
//!
//! Metadata tags first (Open Graph, Twitter card), then marketplace image
//! elements, then generic gallery patterns, and finally the largest
//! qualifying `<img>` on the page.

use std::sync::Arc;

use scraper::{ElementRef, Selector};

use super::document::{image_area, non_empty_attr, PageDocument};
use super::rules::{Cascade, Rule};
use crate::types::settings::ExtractionPolicy;

/// Image selectors in priority order.
pub const IMAGE_SELECTORS: &[&str] = &[
    // Metadata
    "meta[property=\"og:image\"]",
    "meta[property=\"og:image:secure_url\"]",
    "meta[name=\"twitter:image\"]",
    "meta[property=\"twitter:image\"]",
    // Marketplaces
    "#landingImage",
    "#imgBlkFront",
    "#imgTagWrapperId img",
    "#main-image",
    "[data-test=\"product-image\"] img",
    ".ux-image-carousel-item img",
    "img[data-testid=\"hero-image\"]",
    "img[itemprop=\"image\"]",
    // Generic patterns
    "[class*=\"product-image\"] img",
    "[class*=\"productImage\"] img",
    "[class*=\"ProductImage\"] img",
    "[class*=\"main-image\"] img",
    "[class*=\"gallery\"] img",
];

/// Amazon's map of `{ "<url>": [w, h], ... }` on the hero image.
const DYNAMIC_IMAGE_ATTR: &str = "data-a-dynamic-image";

/// Builds the image cascade for `policy`.
pub fn cascade(policy: &ExtractionPolicy) -> Cascade {
    let policy = Arc::new(policy.clone());
    let selector_rules = IMAGE_SELECTORS.iter().filter_map(|selector| {
        let policy = Arc::clone(&policy);
        Rule::for_selector(selector, move |doc, sel| read_image(doc, sel, &policy))
    });

    let fallback_policy = Arc::clone(&policy);
    Cascade::new("image")
        .extend(selector_rules)
        .push(Rule::new("largest-image", move |doc| {
            largest_image(doc, &fallback_policy)
        }))
}

/// Runs the default image cascade; empty string when nothing qualified.
pub fn extract_image(doc: &PageDocument, policy: &ExtractionPolicy) -> String {
    cascade(policy).evaluate(doc).unwrap_or_default()
}

/// True if `url` is an absolute http(s) or inline image URL free of denylisted substrings.
pub fn is_valid_image_url(url: &str, policy: &ExtractionPolicy) -> bool {
    let lower = url.to_lowercase();
    if policy
        .image_denylist
        .iter()
        .any(|needle| lower.contains(&needle.to_lowercase()))
    {
        return false;
    }
    url.starts_with("http") || url.starts_with("data:image")
}

fn read_image(doc: &PageDocument, sel: &Selector, policy: &ExtractionPolicy) -> Option<String> {
    let el = doc.select_first(sel)?;
    let candidate = match el.value().name() {
        "meta" => non_empty_attr(&el, "content")?.trim().to_string(),
        "img" => image_candidate(doc, &el)?,
        _ => return None,
    };
    is_valid_image_url(&candidate, policy).then_some(candidate)
}

/// `src`, then `data-src`, then `data-old-hires`, then the dynamic-image map.
fn image_candidate(doc: &PageDocument, img: &ElementRef<'_>) -> Option<String> {
    let src = doc.image_src(img);
    let raw = if !src.is_empty() {
        src
    } else {
        non_empty_attr(img, "data-src")
            .or_else(|| non_empty_attr(img, "data-old-hires"))
            .or_else(|| non_empty_attr(img, DYNAMIC_IMAGE_ATTR))?
            .trim()
            .to_string()
    };

    if raw.starts_with('{') {
        first_json_key(&raw)
    } else {
        Some(raw)
    }
}

/// First key of a JSON object, in source order. Malformed JSON yields `None`.
pub fn first_json_key(raw: &str) -> Option<String> {
    let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw).ok()?;
    parsed.keys().next().cloned()
}

/// Largest `<img>` above the area threshold with a valid URL; first seen wins ties.
fn largest_image(doc: &PageDocument, policy: &ExtractionPolicy) -> Option<String> {
    let mut best: Option<(u64, String)> = None;
    for img in doc.images() {
        let area = image_area(&img);
        if area <= policy.min_image_area {
            continue;
        }
        let src = doc.image_src(&img);
        if !is_valid_image_url(&src, policy) {
            continue;
        }
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((area, src));
        }
    }
    best.map(|(_, src)| src)
}
