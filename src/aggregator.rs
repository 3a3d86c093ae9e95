//! One aggregation run over every source.
//!
//! [`run_all`] opens the browser session, runs the scrapers in a fixed order
//! (news, featured image, facts, hemispheres), stamps the record and closes
//! the session. Opening the session is the only step that can fail the run;
//! each scraper reports its own failures as absent fields.
//!
//! The session is closed on every path that returns. If a scraper panics the
//! session is dropped during unwinding instead, which still tears the browser
//! down (see [`crate::session::chrome`]).

use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::models::AggregatedRecord;
use crate::scrapers::{facts, featured_image, hemispheres, news};
use crate::session::PageFetcher;
use crate::utils::stamp_now;
use reqwest::Client;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Open a session with `open`, scrape every source and return the record.
///
/// # Errors
///
/// Only the error returned by `open`; nothing is scraped in that case.
#[instrument(level = "info", skip_all)]
pub async fn run_all<S, F, Fut>(
    open: F,
    client: &Client,
    config: &SourceConfig,
) -> Result<AggregatedRecord, ScrapeError>
where
    S: PageFetcher,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<S, ScrapeError>>,
{
    let t0 = Instant::now();
    let mut session = open().await?;

    let record = collect(&mut session, client, config).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "Session did not close cleanly");
    }

    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        present = record.present_fields(),
        hemispheres = record.hemispheres.len(),
        "Aggregation complete"
    );
    Ok(record)
}

async fn collect<S: PageFetcher>(
    session: &mut S,
    client: &Client,
    config: &SourceConfig,
) -> AggregatedRecord {
    let (news_title, news_paragraph) = news::scrape(session, config).await;
    let featured_image = featured_image::scrape(session, config).await;
    let facts = facts::scrape(client, config).await;
    let hemispheres = hemispheres::scrape(session, config).await;

    AggregatedRecord {
        news_title,
        news_paragraph,
        featured_image,
        facts,
        hemispheres,
        last_modified: stamp_now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixture::FixtureSession;
    use std::sync::atomic::Ordering;

    const NEWS: &str = "http://news.test/index.html";
    const IMAGES: &str = "http://jpl.test/JPL_Space/index.html";
    const HEMIS: &str = "http://hemispheres.test/";

    fn config() -> SourceConfig {
        SourceConfig {
            news_url: NEWS.to_string(),
            image_url: IMAGES.to_string(),
            image_base_url: "http://jpl.test/JPL_Space/".to_string(),
            // discard port: refused immediately
            facts_url: "http://127.0.0.1:9/Mars_Facts/index.html".to_string(),
            hemispheres_url: HEMIS.to_string(),
            hemispheres_base_url: HEMIS.to_string(),
            ..SourceConfig::default()
        }
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn snapshot() -> FixtureSession {
        FixtureSession::new()
            .page(
                NEWS,
                r#"<div class="list_text"><div class="content_title">NASA's Perseverance Rover Finds Clay</div>
                   <div class="article_teaser_body">Scientists are studying the samples.</div></div>"#,
            )
            .page(IMAGES, "<button>nav</button><button>FULL IMAGE</button>")
            .on_click(
                IMAGES,
                "button",
                1,
                r#"<img class="fancybox-image" src="image/featured/mars1.jpg">"#,
            )
            .page(
                HEMIS,
                r#"<div class="item"><div class="description"><a href="cerberus.html"><h3>Cerberus Hemisphere Enhanced</h3></a></div></div>"#,
            )
            .page(
                "http://hemispheres.test/cerberus.html",
                r#"<img class="wide-image" src="images/cerberus_full.jpg">"#,
            )
    }

    #[tokio::test]
    async fn test_run_all_collects_every_source() {
        let session = snapshot();
        let closes = session.close_counter();

        let record = run_all(move || async move { Ok(session) }, &client(), &config())
            .await
            .unwrap();

        assert_eq!(record.news_title.as_deref(), Some("NASA's Perseverance Rover Finds Clay"));
        assert_eq!(record.news_paragraph.as_deref(), Some("Scientists are studying the samples."));
        assert_eq!(
            record.featured_image.as_deref(),
            Some("http://jpl.test/JPL_Space/image/featured/mars1.jpg")
        );
        assert_eq!(record.facts, None);
        assert_eq!(record.hemispheres.len(), 1);
        assert_eq!(record.hemispheres[0].img_url, "http://hemispheres.test/images/cerberus_full.jpg");
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_source_missing_still_yields_record() {
        let session = FixtureSession::new();
        let closes = session.close_counter();

        let record = run_all(move || async move { Ok(session) }, &client(), &config())
            .await
            .unwrap();

        assert_eq!(record.present_fields(), 0);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_launch_failure_aborts() {
        let result = run_all(
            || async { Err::<FixtureSession, _>(ScrapeError::Launch("chrome not found".into())) },
            &client(),
            &config(),
        )
        .await;
        assert!(matches!(result, Err(ScrapeError::Launch(_))));
    }

    #[tokio::test]
    async fn test_repeated_runs_differ_only_in_timestamp() {
        let first = run_all(|| async { Ok(snapshot()) }, &client(), &config())
            .await
            .unwrap();
        let second = run_all(|| async { Ok(snapshot()) }, &client(), &config())
            .await
            .unwrap();

        assert!(first.same_content(&second));
        assert!(second.last_modified >= first.last_modified);
    }
}
