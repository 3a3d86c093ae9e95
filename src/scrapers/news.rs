//! Latest Mars news headline and teaser.
//!
//! The news index renders its list client-side, so the page is loaded in the
//! browser and given a short, bounded wait for the first `div.list_text` to
//! appear. The first list entry is the latest article.

use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::extract::{Selector, require_first, text};
use crate::session::PageFetcher;
use crate::utils::truncate_for_log;
use scraper::Html;
use tracing::{debug, info, instrument, warn};

pub const LIST_TEXT: Selector = Selector::class("div", "list_text");
pub const CONTENT_TITLE: Selector = Selector::class("div", "content_title");
pub const TEASER_BODY: Selector = Selector::class("div", "article_teaser_body");

/// Headline and teaser of the latest article.
///
/// Both are absent when the list, or either part of its first entry, cannot
/// be found.
#[instrument(level = "info", skip_all, fields(url = %config.news_url))]
pub async fn scrape<S: PageFetcher>(
    session: &mut S,
    config: &SourceConfig,
) -> (Option<String>, Option<String>) {
    match fetch(session, config).await {
        Ok((title, teaser)) => {
            info!(title = %truncate_for_log(&title, 80), "Scraped latest news");
            (Some(title), Some(teaser))
        }
        Err(e) => {
            warn!(error = %e, "News unavailable; title and teaser left absent");
            (None, None)
        }
    }
}

async fn fetch<S: PageFetcher>(
    session: &mut S,
    config: &SourceConfig,
) -> Result<(String, String), ScrapeError> {
    session.visit(&config.news_url).await?;
    if !session
        .wait_for_selector(&LIST_TEXT.css(), config.news_wait())
        .await
    {
        debug!(wait_secs = config.news_wait_secs, "News list not rendered in time; reading page as-is");
    }
    let html = session.current_markup().await?;
    parse_news(&html)
}

/// Title and teaser of the first `div.list_text` in `html`.
pub fn parse_news(html: &str) -> Result<(String, String), ScrapeError> {
    let document = Html::parse_document(html);
    let slide = require_first(document.root_element(), &LIST_TEXT)?;
    let title = text(require_first(slide, &CONTENT_TITLE)?);
    let teaser = text(require_first(slide, &TEASER_BODY)?);
    Ok((title, teaser))
}
