//! Parsed snapshot of a tab's document.
//!
//! Wraps `scraper::Html` with the handful of DOM reads the field extractors
//! need, emulating the live-DOM properties they would see in the page
//! (`img.src` resolution, natural vs rendered image size, `innerText`).

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never renders.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Attributes the in-page snapshotter writes with `naturalWidth`/`naturalHeight`.
const NATURAL_WIDTH_ATTR: &str = "data-natural-width";
const NATURAL_HEIGHT_ATTR: &str = "data-natural-height";

/// A page's HTML parsed once, plus the URL it was loaded from.
pub struct PageDocument {
    html: Html,
    url: String,
    base: Option<Url>,
}

impl PageDocument {
    /// Parses `html` as served at `url`. Never fails; broken markup is recovered.
    pub fn parse(url: &str, html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            url: url.to_string(),
            base: Url::parse(url).ok(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Hostname of the page URL, or empty when the URL has none.
    pub fn domain(&self) -> String {
        self.base
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or_default()
            .to_string()
    }

    /// First element in document order matching `selector` (`querySelector`).
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// All matching elements in document order (`querySelectorAll`).
    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    /// Text of the `<title>` element, trimmed.
    pub fn title(&self) -> String {
        let Ok(sel) = Selector::parse("title") else {
            return String::new();
        };
        self.select_first(&sel)
            .map(|el| element_text(&el))
            .unwrap_or_default()
    }

    /// Rendered text of `<body>`, skipping script and style content.
    ///
    /// Text nodes are joined with single spaces, which approximates the line
    /// breaks `innerText` inserts between blocks.
    pub fn visible_text(&self) -> String {
        let Ok(body_sel) = Selector::parse("body") else {
            return String::new();
        };
        let Some(body) = self.select_first(&body_sel) else {
            return String::new();
        };

        let mut parts: Vec<&str> = Vec::new();
        for node in body.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| INVISIBLE_TAGS.contains(&e.name()))
            });
            let trimmed = text.trim();
            if !hidden && !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.join(" ")
    }

    /// Every `<img>` on the page, in document order.
    pub fn images(&self) -> Vec<ElementRef<'_>> {
        match Selector::parse("img") {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Resolves a possibly relative reference against the page URL.
    ///
    /// Mirrors the browser's `img.src` getter; unresolvable input is returned unchanged.
    pub fn resolve(&self, reference: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(reference)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| reference.to_string()),
            None => reference.to_string(),
        }
    }

    /// The value `img.src` would report: the resolved `src` attribute, or empty.
    pub fn image_src(&self, img: &ElementRef<'_>) -> String {
        match non_empty_attr(img, "src") {
            Some(src) => self.resolve(src),
            None => String::new(),
        }
    }
}

/// Trimmed `textContent` of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Attribute value when present and not blank.
pub fn non_empty_attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).filter(|v| !v.trim().is_empty())
}

/// `width * height`, preferring natural dimensions per axis over rendered ones.
pub fn image_area(img: &ElementRef<'_>) -> u64 {
    let width = dimension(img, NATURAL_WIDTH_ATTR).or_else(|| dimension(img, "width"));
    let height = dimension(img, NATURAL_HEIGHT_ATTR).or_else(|| dimension(img, "height"));
    width.unwrap_or(0).saturating_mul(height.unwrap_or(0))
}

/// Leading integer of a size attribute (`"640"`, `"640px"`), ignoring zero.
fn dimension(el: &ElementRef<'_>, attr: &str) -> Option<u64> {
    let raw = el.value().attr(attr)?.trim();
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().ok().filter(|v| *v > 0)
}
