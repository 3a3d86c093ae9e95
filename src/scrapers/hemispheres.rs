//! Full-resolution hemisphere pictures.
//!
//! The gallery index lists one `div.item` per hemisphere, each linking to a
//! detail page that holds the full-resolution `img.wide-image`. Collection
//! runs in two passes:
//!
//! 1. Load the index once and capture every entry's title and absolute
//!    detail URL, in document order.
//! 2. Visit each detail URL and resolve its wide image.
//!
//! Because the entry list is captured before any detail page is opened, the
//! traversal never depends on navigating back to the index.
//!
//! An entry whose link, title or image is missing is logged and left out;
//! the others are still returned in gallery order.

use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::extract::{Selector, attribute, find_all, require_first, text};
use crate::models::HemisphereEntry;
use crate::session::PageFetcher;
use crate::utils::resolve_url;
use scraper::Html;
use tracing::{debug, info, instrument, warn};

pub const ITEM: Selector = Selector::class("div", "item");
pub const HEADING: Selector = Selector::tag("h3");
pub const DESCRIPTION: Selector = Selector::class("div", "description");
pub const LINK: Selector = Selector::tag("a");
pub const WIDE_IMAGE: Selector = Selector::class("img", "wide-image");

/// One gallery entry as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryLink {
    pub title: String,
    pub detail_url: String,
}

/// Every hemisphere that could be resolved, in gallery order.
///
/// Empty when the index is unreachable or lists no entries.
#[instrument(level = "info", skip_all, fields(url = %config.hemispheres_url))]
pub async fn scrape<S: PageFetcher>(session: &mut S, config: &SourceConfig) -> Vec<HemisphereEntry> {
    let links = match index(session, config).await {
        Ok(links) => links,
        Err(e) => {
            warn!(error = %e, "Hemisphere gallery unavailable; no entries");
            return Vec::new();
        }
    };
    info!(count = links.len(), "Indexed hemisphere gallery");

    let mut entries = Vec::with_capacity(links.len());
    for link in links {
        match detail(session, config, &link).await {
            Ok(img_url) => {
                debug!(title = %link.title, %img_url, "Resolved hemisphere image");
                entries.push(HemisphereEntry {
                    title: link.title,
                    img_url,
                });
            }
            Err(e) => {
                warn!(title = %link.title, url = %link.detail_url, error = %e, "Skipping hemisphere entry");
            }
        }
    }

    info!(count = entries.len(), "Scraped hemispheres");
    entries
}

async fn index<S: PageFetcher>(
    session: &mut S,
    config: &SourceConfig,
) -> Result<Vec<GalleryLink>, ScrapeError> {
    session.visit(&config.hemispheres_url).await?;
    let html = session.current_markup().await?;
    parse_gallery(&html, &config.hemispheres_base_url)
}

async fn detail<S: PageFetcher>(
    session: &mut S,
    config: &SourceConfig,
    link: &GalleryLink,
) -> Result<String, ScrapeError> {
    session.visit(&link.detail_url).await?;
    let html = session.current_markup().await?;
    let src = parse_wide_image(&html)?;
    resolve_url(&config.hemispheres_base_url, &src)
}

/// Title and absolute detail URL of every `div.item`, in document order.
///
/// Items without a usable link are dropped with a warning.
pub fn parse_gallery(html: &str, base_url: &str) -> Result<Vec<GalleryLink>, ScrapeError> {
    let document = Html::parse_document(html);
    let items = find_all(document.root_element(), &ITEM)?;
    let mut links = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let parsed = require_first(item, &HEADING).and_then(|heading| {
            let description = require_first(item, &DESCRIPTION)?;
            let anchor = require_first(description, &LINK)?;
            let href = attribute(anchor, "href")
                .ok_or_else(|| ScrapeError::not_found(format!("{DESCRIPTION} {LINK}[href]")))?;
            Ok(GalleryLink {
                title: text(heading),
                detail_url: resolve_url(base_url, &href)?,
            })
        });
        match parsed {
            Ok(link) => links.push(link),
            Err(e) => warn!(position, error = %e, "Gallery item has no usable link"),
        }
    }
    Ok(links)
}

/// `src` of the detail page's full-resolution image.
pub fn parse_wide_image(html: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    let img = require_first(document.root_element(), &WIDE_IMAGE)?;
    attribute(img, "src").ok_or_else(|| ScrapeError::not_found(format!("{WIDE_IMAGE}[src]")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixture::FixtureSession;

    const BASE: &str = "http://hemispheres.test/";

    fn item(title: &str, href: &str) -> String {
        format!(
            r#"<div class="item">
                 <a href="{href}" class="itemLink product-item"><img class="thumb" src="images/thumb.png"></a>
                 <div class="description">
                   <a href="{href}" class="itemLink product-item"><h3>{title}</h3></a>
                   <span class="subtitle">Mosaic of the hemisphere</span>
                 </div>
               </div>"#
        )
    }

    fn detail_page(src: &str) -> String {
        format!(r#"<html><body><img class="wide-image" src="{src}"><a href="{src}">Sample</a></body></html>"#)
    }

    fn config() -> SourceConfig {
        SourceConfig {
            hemispheres_url: BASE.to_string(),
            hemispheres_base_url: BASE.to_string(),
            ..SourceConfig::default()
        }
    }

    fn gallery(items: &[(&str, &str)]) -> String {
        let body: String = items.iter().map(|(t, h)| item(t, h)).collect();
        format!(r#"<html><body><div class="collapsible results">{body}</div></body></html>"#)
    }

    #[tokio::test]
    async fn test_entries_in_document_order() {
        let names = [
            ("Cerberus Hemisphere Enhanced", "cerberus.html"),
            ("Schiaparelli Hemisphere Enhanced", "schiaparelli.html"),
            ("Syrtis Major Hemisphere Enhanced", "syrtis.html"),
            ("Valles Marineris Hemisphere Enhanced", "valles.html"),
        ];
        let mut session = FixtureSession::new().page(BASE, &gallery(&names));
        for (_, href) in names {
            let stem = href.trim_end_matches(".html");
            session = session.page(
                &format!("{BASE}{href}"),
                &detail_page(&format!("images/{stem}_enhanced-full.jpg")),
            );
        }

        let entries = scrape(&mut session, &config()).await;

        assert_eq!(entries.len(), names.len());
        for (entry, (title, href)) in entries.iter().zip(names) {
            assert_eq!(entry.title, title);
            let stem = href.trim_end_matches(".html");
            assert_eq!(entry.img_url, format!("{BASE}images/{stem}_enhanced-full.jpg"));
        }
        // index once, then each detail page, never back to the index
        assert_eq!(session.visits.len(), 1 + names.len());
        assert_eq!(session.visits[0], BASE);
    }

    #[tokio::test]
    async fn test_empty_gallery_is_empty_sequence() {
        let mut session = FixtureSession::new().page(BASE, &gallery(&[]));
        assert!(scrape(&mut session, &config()).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_gallery_is_empty_sequence() {
        let mut session = FixtureSession::new();
        assert!(scrape(&mut session, &config()).await.is_empty());
    }

    #[tokio::test]
    async fn test_entry_without_wide_image_is_skipped() {
        let names = [("Cerberus", "cerberus.html"), ("Valles", "valles.html")];
        let mut session = FixtureSession::new()
            .page(BASE, &gallery(&names))
            .page(&format!("{BASE}cerberus.html"), "<html><body>no image</body></html>")
            .page(&format!("{BASE}valles.html"), &detail_page("images/valles.jpg"));

        let entries = scrape(&mut session, &config()).await;

        assert_eq!(
            entries,
            [HemisphereEntry {
                title: "Valles".to_string(),
                img_url: format!("{BASE}images/valles.jpg"),
            }]
        );
    }

    #[test]
    fn test_item_without_link_is_dropped() {
        let html = format!(
            r#"<div class="item"><div class="description"><h3>No link</h3></div></div>{}"#,
            item("Syrtis", "syrtis.html")
        );
        let links = parse_gallery(&html, BASE).unwrap();
        assert_eq!(
            links,
            [GalleryLink {
                title: "Syrtis".to_string(),
                detail_url: format!("{BASE}syrtis.html"),
            }]
        );
    }
}
