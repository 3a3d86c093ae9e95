//! Markdown rendering of the aggregated record.
//!
//! Produces a single page with a section per source. The facts fragment is
//! raw HTML and is embedded as-is, which Markdown renderers pass through.
//! Absent fields are shown as an explicit "not available" line rather than
//! being silently dropped.

use crate::models::AggregatedRecord;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

pub const FILE_NAME: &str = "mars.md";

const NOT_AVAILABLE: &str = "_Not available._";

/// Render `record` as a Markdown document.
pub fn record_to_markdown(record: &AggregatedRecord) -> String {
    let mut md = String::new();

    // fmt::Write into a String cannot fail.
    let _ = writeln!(md, "# Mission to Mars\n");
    let _ = writeln!(
        md,
        "_Last updated {}_\n",
        record.last_modified.format("%Y-%m-%d %H:%M:%S UTC")
    );

    md.push_str("## Latest News\n\n");
    match (&record.news_title, &record.news_paragraph) {
        (Some(title), Some(paragraph)) => {
            let _ = writeln!(md, "### {title}\n\n{paragraph}\n");
        }
        (Some(title), None) => {
            let _ = writeln!(md, "### {title}\n");
        }
        _ => {
            let _ = writeln!(md, "{NOT_AVAILABLE}\n");
        }
    }

    md.push_str("## Featured Mars Image\n\n");
    match &record.featured_image {
        Some(url) => {
            let _ = writeln!(md, "![Featured Mars image]({url})\n");
        }
        None => {
            let _ = writeln!(md, "{NOT_AVAILABLE}\n");
        }
    }

    md.push_str("## Mars Facts\n\n");
    match &record.facts {
        Some(html) => {
            let _ = writeln!(md, "{html}\n");
        }
        None => {
            let _ = writeln!(md, "{NOT_AVAILABLE}\n");
        }
    }

    md.push_str("## Mars Hemispheres\n\n");
    if record.hemispheres.is_empty() {
        let _ = writeln!(md, "{NOT_AVAILABLE}");
    } else {
        let sections = record
            .hemispheres
            .iter()
            .map(|h| format!("### {}\n\n![{}]({})\n", h.title, h.title, h.img_url))
            .join("\n");
        md.push_str(&sections);
    }

    md
}

/// Write the Markdown rendering of `record` under `markdown_output_dir`.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir))]
pub async fn write_record(
    record: &AggregatedRecord,
    markdown_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let md = record_to_markdown(record);
    fs::create_dir_all(markdown_output_dir).await?;
    let path = PathBuf::from(markdown_output_dir).join(FILE_NAME);
    fs::write(&path, md).await?;
    info!(path = %path.display(), "Wrote Markdown record");
    Ok(path)
}
