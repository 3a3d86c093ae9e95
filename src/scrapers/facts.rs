//! Mars/Earth comparison facts table.
//!
//! This source is static HTML, so it is fetched directly with `reqwest`
//! rather than through the browser session. The first table on the page is
//! taken, its columns renamed to [`SourceConfig::facts_columns`], the first of
//! those made the row key, and the result rendered as a styled HTML fragment
//! ready to be embedded by whatever displays the record.

use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::table::{Table, fetch_tables};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// The facts table as an HTML fragment, or absent on any fetch or shape failure.
#[instrument(level = "info", skip_all, fields(url = %config.facts_url))]
pub async fn scrape(client: &Client, config: &SourceConfig) -> Option<String> {
    let result = fetch_tables(client, &config.facts_url)
        .await
        .and_then(|tables| render_first(tables, config));
    match result {
        Ok(html) => {
            info!(bytes = html.len(), "Scraped facts table");
            Some(html)
        }
        Err(e) => {
            warn!(error = %e, "Facts table unavailable; left absent");
            None
        }
    }
}

/// Rename, key and render the first table.
pub fn render_first(tables: Vec<Table>, config: &SourceConfig) -> Result<String, ScrapeError> {
    let mut table = tables
        .into_iter()
        .next()
        .ok_or_else(|| ScrapeError::StructuralAssumption("no tables on facts page".to_string()))?;
    debug!(columns = ?table.columns(), rows = table.rows().len(), "Facts table as published");
    table.rename_columns(&config.facts_columns)?;
    let key = config
        .facts_columns
        .first()
        .ok_or_else(|| ScrapeError::StructuralAssumption("no facts columns configured".to_string()))?;
    table.set_index(key)?;
    Ok(table.to_html(&config.facts_table_classes))
}
