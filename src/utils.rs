//! Utility functions for URLs, text cleanup, timestamps and output directories.
//!
//! - URL resolution against a source's base URL
//! - Whitespace normalization for extracted text
//! - A monotonic capture timestamp for records
//! - String truncation for logging
//! - File system validation for output directories

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::sync::Mutex;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

use crate::error::ScrapeError;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static LAST_STAMP: Lazy<Mutex<DateTime<Utc>>> = Lazy::new(|| Mutex::new(DateTime::<Utc>::MIN_UTC));

/// Resolve a link found on a page against the source's base URL.
///
/// Absolute links are returned unchanged; relative ones are joined under
/// `base`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     resolve_url("https://marshemispheres.com/", "images/full.jpg")?,
///     "https://marshemispheres.com/images/full.jpg"
/// );
/// ```
pub fn resolve_url(base: &str, link: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(base)?;
    Ok(base.join(link.trim())?.to_string())
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_text(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Current UTC time, never earlier than any value previously returned.
///
/// Wall clocks can step backwards; records stamped in sequence within one
/// process must not.
pub fn stamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    let mut last = match LAST_STAMP.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if now > *last {
        *last = now;
    }
    *last
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
