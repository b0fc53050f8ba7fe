//! Extraction rules as data.
//!
//! A [`Rule`] is a named pure function from a document to an optional value.
//! A [`Cascade`] evaluates rules in priority order and returns the first hit,
//! so field extractors are just ordered lists of rules.

use scraper::Selector;
use tracing::{debug, warn};

use super::document::PageDocument;

type RuleFn = dyn Fn(&PageDocument) -> Option<String> + Send + Sync;

/// One named heuristic producing a field value from a document.
pub struct Rule {
    name: String,
    eval: Box<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: impl Into<String>, eval: F) -> Self
    where
        F: Fn(&PageDocument) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            eval: Box::new(eval),
        }
    }

    /// Builds a rule around a CSS selector, or `None` if the selector does not parse.
    ///
    /// `read` receives the compiled selector and turns matches into a value.
    pub fn for_selector<F>(selector: &str, read: F) -> Option<Self>
    where
        F: Fn(&PageDocument, &Selector) -> Option<String> + Send + Sync + 'static,
    {
        let compiled = match Selector::parse(selector) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(selector, error = %e, "skipping unparseable selector");
                return None;
            }
        };
        Some(Self::new(selector, move |doc| read(doc, &compiled)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, doc: &PageDocument) -> Option<String> {
        (self.eval)(doc)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Ordered list of rules; the first rule yielding a value wins.
#[derive(Debug, Default)]
pub struct Cascade {
    field: &'static str,
    rules: Vec<Rule>,
}

impl Cascade {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    pub fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn extend(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn evaluate(&self, doc: &PageDocument) -> Option<String> {
        for rule in &self.rules {
            if let Some(value) = rule.apply(doc) {
                debug!(field = self.field, rule = rule.name(), "cascade hit");
                return Some(value);
            }
        }
        debug!(field = self.field, "cascade exhausted");
        None
    }
}
