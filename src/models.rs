//! Data models for one aggregation run.
//!
//! - [`AggregatedRecord`]: everything collected in a run, stamped with the
//!   capture time
//! - [`HemisphereEntry`]: one hemisphere picture from the gallery
//!
//! Every field that comes from a page is optional: a scraper that cannot find
//! what it is looking for leaves its field absent (`null` once serialized)
//! rather than failing the run. Absent is distinct from an empty string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The combined result of visiting every source once.
///
/// Built once at the end of a run and not modified afterwards; the caller of
/// [`crate::aggregator::run_all`] owns it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregatedRecord {
    /// Headline of the latest news item.
    pub news_title: Option<String>,
    /// Teaser paragraph of the latest news item.
    pub news_paragraph: Option<String>,
    /// Absolute URL of the full-size featured image.
    pub featured_image: Option<String>,
    /// Facts table rendered as a styled HTML fragment.
    pub facts: Option<String>,
    /// Hemisphere pictures in gallery order.
    pub hemispheres: Vec<HemisphereEntry>,
    /// When the record was captured (UTC).
    pub last_modified: DateTime<Utc>,
}

impl AggregatedRecord {
    /// Number of page-derived fields that were extracted. Hemispheres count
    /// as one field, present when at least one entry was found.
    pub fn present_fields(&self) -> usize {
        [
            self.news_title.is_some(),
            self.news_paragraph.is_some(),
            self.featured_image.is_some(),
            self.facts.is_some(),
            !self.hemispheres.is_empty(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Compare two records ignoring `last_modified`.
    #[cfg(test)]
    pub fn same_content(&self, other: &AggregatedRecord) -> bool {
        self.news_title == other.news_title
            && self.news_paragraph == other.news_paragraph
            && self.featured_image == other.featured_image
            && self.facts == other.facts
            && self.hemispheres == other.hemispheres
    }
}

/// A single hemisphere picture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HemisphereEntry {
    /// Display title, e.g. "Cerberus Hemisphere Enhanced".
    pub title: String,
    /// Absolute URL of the full-resolution image.
    pub img_url: String,
}
