//! # Mars Scrape
//!
//! Collects several pieces of public Mars data from a fixed set of pages and
//! assembles them into a single record for display.
//!
//! ## Features
//!
//! - Latest news headline and teaser from the Mars news index
//! - Full-size featured image from the JPL space image gallery
//! - Mars/Earth facts table, rendered as a styled HTML fragment
//! - Full-resolution pictures of the four Mars hemispheres
//! - Outputs the record as JSON (stdout or file) and as a Markdown page
//!
//! ## Usage
//!
//! ```sh
//! mars_scrape -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! One run is strictly sequential:
//! 1. **Session**: Launch a headless Chrome session (the only fatal step)
//! 2. **Scraping**: Visit each source in turn; failures become absent fields
//! 3. **Stamping**: Record the capture time and close the session
//! 4. **Output**: Print or write the record

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod error;
mod extract;
mod models;
mod outputs;
mod scrapers;
mod session;
mod table;
mod utils;

use cli::Cli;
use config::SourceConfig;
use outputs::{json, markdown};
use session::ChromeSession;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mars_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = SourceConfig::load(args.config.as_deref())?;
    debug!(?config, "Source configuration");

    // Early check: fail before launching a browser if results can't be saved
    for dir in args.output_dirs() {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let chrome_options = args.chrome_options();

    let record = match aggregator::run_all(
        || ChromeSession::launch(&chrome_options),
        &client,
        &config,
    )
    .await
    {
        Ok(record) => record,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Could not start a browser session; nothing was scraped");
            return Err(e.into());
        }
    };

    if let Some(dir) = &args.json_output_dir {
        json::write_record(&record, dir).await?;
    }
    if let Some(dir) = &args.markdown_output_dir {
        markdown::write_record(&record, dir).await?;
    }
    if args.output_dirs().next().is_none() {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        present = record.present_fields(),
        "Execution complete"
    );

    Ok(())
}
