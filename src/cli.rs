//! Command-line interface definitions for Mars Scrape.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Browser options can also be provided via environment variables.

use crate::session::ChromeOptions;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the Mars Scrape application.
///
/// Without any output directory the record is printed to stdout as JSON.
///
/// # Examples
///
/// ```sh
/// # Print the record
/// mars_scrape
///
/// # Write JSON and Markdown
/// mars_scrape -j ./json -m ./markdown
///
/// # Point the sources somewhere else and watch the browser work
/// mars_scrape --config sources.yaml --headful
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML source configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for the JSON record
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown page
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Chrome/Chromium executable (searched for when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headful: bool,

    /// Timeout in seconds for each browser request
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn chrome_options(&self) -> ChromeOptions {
        ChromeOptions {
            executable: self.chrome_path.clone(),
            headful: self.headful,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Output directories that were requested, for the writability check.
    pub fn output_dirs(&self) -> impl Iterator<Item = &str> {
        [&self.json_output_dir, &self.markdown_output_dir]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}
