//! Markup extraction helpers over the `scraper` crate.
//!
//! Scrapers describe what they look for with a [`Selector`] (tag plus
//! optional class) and query parsed documents with [`find_first`] and
//! [`find_all`]. Lookups never panic; a missing node is `None` or an empty
//! list, and the caller decides whether that is an error.
//!
//! Each [`Selector`] is parsed into CSS once per process and reused after
//! that.

use crate::error::ScrapeError;
use crate::utils::normalize_text;
use once_cell::sync::Lazy;
use scraper::ElementRef;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

static COMPILED: Lazy<Mutex<HashMap<Selector, scraper::Selector>>> = Lazy::new(Default::default);

/// A tag name with an optional class, e.g. `div.list_text`.
///
/// A node matches when its tag is `tag` and, if a class is given, the class
/// is one of the node's classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector {
    pub tag: &'static str,
    pub class: Option<&'static str>,
}

impl Selector {
    pub const fn tag(tag: &'static str) -> Self {
        Self { tag, class: None }
    }

    pub const fn class(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag,
            class: Some(class),
        }
    }

    /// CSS form of the selector, usable by both `scraper` and the browser.
    pub fn css(&self) -> String {
        match self.class {
            Some(class) => format!("{}.{}", self.tag, class),
            None => self.tag.to_string(),
        }
    }

    fn compile(&self) -> Result<scraper::Selector, ScrapeError> {
        let mut cache = match COMPILED.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(compiled) = cache.get(self) {
            return Ok(compiled.clone());
        }
        let css = self.css();
        let compiled =
            scraper::Selector::parse(&css).map_err(|_| ScrapeError::Selector(css.clone()))?;
        cache.insert(*self, compiled.clone());
        Ok(compiled)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// First descendant of `root` matching `selector`, in document order.
pub fn find_first<'a>(
    root: ElementRef<'a>,
    selector: &Selector,
) -> Result<Option<ElementRef<'a>>, ScrapeError> {
    Ok(root.select(&selector.compile()?).next())
}

/// Like [`find_first`], but a missing node is [`ScrapeError::ElementNotFound`].
pub fn require_first<'a>(
    root: ElementRef<'a>,
    selector: &Selector,
) -> Result<ElementRef<'a>, ScrapeError> {
    find_first(root, selector)?.ok_or_else(|| ScrapeError::not_found(selector.css()))
}

/// Every descendant of `root` matching `selector`, in document order.
pub fn find_all<'a>(
    root: ElementRef<'a>,
    selector: &Selector,
) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    Ok(root.select(&selector.compile()?).collect())
}

/// Text content of a node with whitespace collapsed.
pub fn text(node: ElementRef<'_>) -> String {
    normalize_text(&node.text().collect::<String>())
}

/// Value of attribute `name`, if the node carries it.
pub fn attribute(node: ElementRef<'_>, name: &str) -> Option<String> {
    node.value().attr(name).map(str::to_string)
}
