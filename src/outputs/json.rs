//! JSON output of the aggregated record.
//!
//! The record is written as `{json_output_dir}/mars.json`, replacing the
//! previous run's file. Absent fields appear as `null`.

use crate::models::AggregatedRecord;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

pub const FILE_NAME: &str = "mars.json";

/// Write `record` as pretty-printed JSON under `json_output_dir`.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_record(
    record: &AggregatedRecord,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(record)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = PathBuf::from(json_output_dir).join(FILE_NAME);
    let bytes = json.len();
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), bytes, "Wrote JSON record");

    Ok(path)
}
