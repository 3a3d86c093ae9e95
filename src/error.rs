//! Error taxonomy for a scrape run.
//!
//! Only [`ScrapeError::Launch`] is allowed to abort an aggregation run. Every
//! other variant is produced by helpers inside a scraper and is converted to
//! an absent field at that scraper's boundary.

use thiserror::Error;

/// Everything that can go wrong while fetching or extracting a source.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser session could not be created (driver or executable missing).
    #[error("failed to launch browser session: {0}")]
    Launch(String),

    /// A page navigation did not complete.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Any other failure reported by the browser over CDP.
    #[error("browser error: {0}")]
    Browser(String),

    /// A selector lookup matched nothing.
    #[error("no element matches `{selector}`")]
    ElementNotFound { selector: String },

    /// The page does not have the shape a scraper was written against
    /// (too few buttons, wrong column count, ...).
    #[error("page structure changed: {0}")]
    StructuralAssumption(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// True for the one failure that must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Launch(_))
    }
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(e.to_string())
    }
}
