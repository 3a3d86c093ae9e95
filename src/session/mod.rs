//! Browser sessions.
//!
//! Scrapers that need a rendered page (news, featured image, hemispheres)
//! talk to the browser only through the [`PageFetcher`] trait. One session
//! is opened per run, passed by `&mut` to each scraper in turn, and closed
//! once by the aggregator.
//!
//! # Implementations
//!
//! | Type | Module | Backing |
//! |------|--------|---------|
//! | [`ChromeSession`] | [`chrome`] | headless Chrome over CDP via `chromiumoxide` |
//! | `FixtureSession` | `fixture` (tests only) | in-memory URL → markup map |

pub mod chrome;
#[cfg(test)]
pub mod fixture;

pub use chrome::{ChromeOptions, ChromeSession};

use crate::error::ScrapeError;
use std::time::Duration;

/// The browser operations scrapers rely on.
///
/// All navigation happens on a single page whose content is replaced by
/// each [`visit`](PageFetcher::visit).
pub trait PageFetcher {
    /// Handle to an element on the current page.
    type Element;

    /// Navigate to `url` and wait for it to load.
    async fn visit(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// Serialized markup of the current page, including script-rendered content.
    async fn current_markup(&mut self) -> Result<String, ScrapeError>;

    /// Wait until an element matching `css` exists or `timeout` elapses.
    ///
    /// Returns whether the element appeared. Never fails: callers continue
    /// with whatever markup is present either way.
    async fn wait_for_selector(&mut self, css: &str, timeout: Duration) -> bool;

    /// Every element with tag `tag` on the current page, in document order.
    async fn find_by_tag(&mut self, tag: &str) -> Result<Vec<Self::Element>, ScrapeError>;

    /// Click an element previously returned by [`find_by_tag`](PageFetcher::find_by_tag).
    async fn click(&mut self, element: &Self::Element) -> Result<(), ScrapeError>;

    /// Navigate one step back in history.
    ///
    /// The hemisphere traversal visits detail URLs directly and never needs
    /// to return to the index, so no scraper calls this today.
    #[allow(dead_code)]
    async fn go_back(&mut self) -> Result<(), ScrapeError>;

    /// Release the session. Consumes the handle so it cannot be used or
    /// closed again.
    async fn close(self) -> Result<(), ScrapeError>;
}
