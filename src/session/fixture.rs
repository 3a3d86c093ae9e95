//! In-memory session for tests.
//!
//! Serves fixed markup per URL, remembers history for `go_back`, and models
//! a click as a switch to alternate markup registered for
//! `(url, tag, index)`. Unknown URLs fail like an unreachable host.

use crate::error::ScrapeError;
use crate::session::PageFetcher;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureElement {
    tag: String,
    index: usize,
}

#[derive(Debug, Default)]
pub struct FixtureSession {
    pages: HashMap<String, String>,
    clicks: HashMap<(String, String, usize), String>,
    history: Vec<String>,
    markup: String,
    /// Every URL passed to `visit`, in order.
    pub visits: Vec<String>,
    closes: Arc<AtomicUsize>,
}

impl FixtureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    /// Markup shown after clicking the `index`-th `tag` element on `url`.
    pub fn on_click(mut self, url: &str, tag: &str, index: usize, markup: &str) -> Self {
        self.clicks
            .insert((url.to_string(), tag.to_string(), index), markup.to_string());
        self
    }

    /// Counter incremented by each `close`; survives the session being consumed.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    fn current_url(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    fn count(&self, css: &str) -> usize {
        let Ok(selector) = Selector::parse(css) else {
            return 0;
        };
        Html::parse_document(&self.markup).select(&selector).count()
    }
}

impl PageFetcher for FixtureSession {
    type Element = FixtureElement;

    async fn visit(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.visits.push(url.to_string());
        let markup = self.pages.get(url).ok_or_else(|| ScrapeError::Navigation {
            url: url.to_string(),
            reason: "host unreachable".to_string(),
        })?;
        self.markup = markup.clone();
        self.history.push(url.to_string());
        Ok(())
    }

    async fn current_markup(&mut self) -> Result<String, ScrapeError> {
        Ok(self.markup.clone())
    }

    async fn wait_for_selector(&mut self, css: &str, _timeout: Duration) -> bool {
        self.count(css) > 0
    }

    async fn find_by_tag(&mut self, tag: &str) -> Result<Vec<FixtureElement>, ScrapeError> {
        Ok((0..self.count(tag))
            .map(|index| FixtureElement {
                tag: tag.to_string(),
                index,
            })
            .collect())
    }

    async fn click(&mut self, element: &FixtureElement) -> Result<(), ScrapeError> {
        let url = self.current_url().unwrap_or_default().to_string();
        if let Some(markup) = self.clicks.get(&(url, element.tag.clone(), element.index)) {
            self.markup = markup.clone();
        }
        Ok(())
    }

    async fn go_back(&mut self) -> Result<(), ScrapeError> {
        if self.history.len() < 2 {
            return Err(ScrapeError::Browser("no history to go back to".to_string()));
        }
        self.history.pop();
        let markup = self
            .current_url()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .unwrap_or_default();
        self.markup = markup;
        Ok(())
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_visit_and_go_back() {
        let mut session = FixtureSession::new()
            .page("http://a/", "<p>a</p>")
            .page("http://b/", "<p>b</p>");
        session.visit("http://a/").await.unwrap();
        session.visit("http://b/").await.unwrap();
        assert!(session.current_markup().await.unwrap().contains("<p>b</p>"));

        session.go_back().await.unwrap();
        assert!(session.current_markup().await.unwrap().contains("<p>a</p>"));
        assert!(session.go_back().await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_url_is_navigation_error() {
        let mut session = FixtureSession::new();
        assert!(matches!(
            session.visit("http://nowhere/").await,
            Err(ScrapeError::Navigation { .. })
        ));
    }

    #[tokio::test]
    async fn test_click_switches_markup() {
        let mut session = FixtureSession::new()
            .page("http://a/", "<button>x</button><button>y</button>")
            .on_click("http://a/", "button", 1, "<img class=\"big\">");
        session.visit("http://a/").await.unwrap();
        let buttons = session.find_by_tag("button").await.unwrap();
        assert_eq!(buttons.len(), 2);

        session.click(&buttons[0]).await.unwrap();
        assert!(!session.wait_for_selector("img.big", Duration::ZERO).await);
        session.click(&buttons[1]).await.unwrap();
        assert!(session.wait_for_selector("img.big", Duration::ZERO).await);
    }
}
