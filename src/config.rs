//! Source configuration.
//!
//! Every URL a run visits, plus the structural constants the scrapers depend
//! on, lives in [`SourceConfig`]. The defaults point at the live Mars pages;
//! a YAML file can override any subset of fields:
//!
//! ```yaml
//! news_url: http://localhost:8000/news.html
//! news_wait_secs: 3
//! expand_button_index: 1
//! ```

use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_NEWS_URL: &str = "https://data-class-mars.s3.amazonaws.com/Mars/index.html";
pub const DEFAULT_IMAGE_URL: &str =
    "https://data-class-jpl-space.s3.amazonaws.com/JPL_Space/index.html";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://data-class-jpl-space.s3.amazonaws.com/JPL_Space/";
pub const DEFAULT_FACTS_URL: &str =
    "https://data-class-mars-facts.s3.amazonaws.com/Mars_Facts/index.html";
pub const DEFAULT_HEMISPHERES_URL: &str = "https://marshemispheres.com/";

/// Where each source lives and what shape it is expected to have.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// News index page.
    pub news_url: String,
    /// How long to wait for the news list to render before reading markup.
    pub news_wait_secs: u64,
    /// Featured image gallery page.
    pub image_url: String,
    /// Base against which the full-size image path is resolved.
    pub image_base_url: String,
    /// How long to wait for the image viewer to open after the click.
    pub image_wait_secs: u64,
    /// Position of the "full image" button among all `<button>` elements.
    /// Precondition: the gallery has at least `expand_button_index + 1` buttons.
    pub expand_button_index: usize,
    /// Page holding the facts table (fetched without the browser).
    pub facts_url: String,
    /// Names given to the facts table columns; the first becomes the row key.
    /// Precondition: the first table on the page has exactly this many columns.
    pub facts_columns: Vec<String>,
    /// CSS classes added to the rendered facts table.
    pub facts_table_classes: Vec<String>,
    /// Hemisphere gallery index.
    pub hemispheres_url: String,
    /// Base against which detail-page links and image paths are resolved.
    pub hemispheres_base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            news_url: DEFAULT_NEWS_URL.to_string(),
            news_wait_secs: 1,
            image_url: DEFAULT_IMAGE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            image_wait_secs: 1,
            expand_button_index: 1,
            facts_url: DEFAULT_FACTS_URL.to_string(),
            facts_columns: vec![
                "Description".to_string(),
                "Mars".to_string(),
                "Earth".to_string(),
            ],
            facts_table_classes: vec!["table".to_string(), "table-striped".to_string()],
            hemispheres_url: DEFAULT_HEMISPHERES_URL.to_string(),
            hemispheres_base_url: DEFAULT_HEMISPHERES_URL.to_string(),
        }
    }
}

impl SourceConfig {
    /// Load configuration from a YAML file, or the defaults when `path` is `None`.
    ///
    /// Base URLs are normalized to end with `/` so that relative paths join
    /// underneath them instead of replacing their last segment.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ScrapeError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let config = Self::from_yaml(&raw)?;
                info!(path, "Loaded source configuration");
                config
            }
            None => Self::default(),
        };
        Ok(config.normalized())
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ScrapeError> {
        let config: SourceConfig = serde_yaml::from_str(raw)?;
        Ok(config.normalized())
    }

    pub fn news_wait(&self) -> Duration {
        Duration::from_secs(self.news_wait_secs)
    }

    pub fn image_wait(&self) -> Duration {
        Duration::from_secs(self.image_wait_secs)
    }

    fn normalized(mut self) -> Self {
        for base in [&mut self.image_base_url, &mut self.hemispheres_base_url] {
            if !base.ends_with('/') {
                base.push('/');
            }
        }
        self
    }
}
