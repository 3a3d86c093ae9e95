//! Featured image from the JPL space image gallery.
//!
//! The gallery shows a thumbnail; the full-size image only enters the DOM
//! after the "full image" button is clicked and the lightbox opens. That
//! button is identified purely by position among the page's `<button>`
//! elements ([`SourceConfig::expand_button_index`], the second by default).

use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::extract::{Selector, attribute, require_first};
use crate::session::PageFetcher;
use crate::utils::resolve_url;
use scraper::Html;
use tracing::{debug, info, instrument, warn};

pub const FULL_IMAGE: Selector = Selector::class("img", "fancybox-image");
const BUTTON_TAG: &str = "button";

/// Absolute URL of the full-size featured image, or absent when the viewer
/// cannot be opened or holds no image.
#[instrument(level = "info", skip_all, fields(url = %config.image_url))]
pub async fn scrape<S: PageFetcher>(session: &mut S, config: &SourceConfig) -> Option<String> {
    match fetch(session, config).await {
        Ok(url) => {
            info!(%url, "Scraped featured image");
            Some(url)
        }
        Err(e) => {
            warn!(error = %e, "Featured image unavailable; left absent");
            None
        }
    }
}

async fn fetch<S: PageFetcher>(session: &mut S, config: &SourceConfig) -> Result<String, ScrapeError> {
    session.visit(&config.image_url).await?;

    let buttons = session.find_by_tag(BUTTON_TAG).await?;
    let expand = buttons.get(config.expand_button_index).ok_or_else(|| {
        ScrapeError::StructuralAssumption(format!(
            "expected at least {} buttons, found {}",
            config.expand_button_index + 1,
            buttons.len()
        ))
    })?;
    session.click(expand).await?;
    // The lightbox is injected by script.
    if !session
        .wait_for_selector(&FULL_IMAGE.css(), config.image_wait())
        .await
    {
        debug!(wait_secs = config.image_wait_secs, "Image viewer not open in time; reading page as-is");
    }

    let html = session.current_markup().await?;
    let relative = parse_image_path(&html)?;
    resolve_url(&config.image_base_url, &relative)
}

/// `src` of the lightbox image, as written in the page (usually relative).
pub fn parse_image_path(html: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    let img = require_first(document.root_element(), &FULL_IMAGE)?;
    attribute(img, "src").ok_or_else(|| ScrapeError::not_found(format!("{FULL_IMAGE}[src]")))
}
