//! Output generation for JSON and Markdown.
//!
//! # Submodules
//!
//! - [`json`]: Writes the `AggregatedRecord` as JSON for programmatic consumers
//! - [`markdown`]: Renders the `AggregatedRecord` as a readable Markdown page
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── mars.json
//!
//! markdown_output_dir/
//! └── mars.md
//! ```
//!
//! Both files are replaced on every run.

pub mod json;
pub mod markdown;
