//! HTML table fetching and rendering.
//!
//! [`fetch_tables`] downloads a page without the browser and parses every
//! `<table>` into a [`Table`]. A table can have its columns renamed, one
//! column promoted to the row key, and be rendered back to an HTML fragment
//! with display classes for direct embedding in a page.
//!
//! # Header detection
//!
//! - the first `<thead>` row, when the table has a `<thead>`
//! - otherwise the first row, when every cell in it is a `<th>`
//! - otherwise positional names `0`, `1`, `2`, ...
//!
//! Only a table's own rows and their direct `<th>`/`<td>` cells are read. A
//! table nested inside a cell contributes its text to that cell and is parsed
//! as a separate table of its own.

use crate::error::ScrapeError;
use crate::utils::normalize_text;
use html_escape::{encode_double_quoted_attribute, encode_text};
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::fmt::Write;
use tracing::{debug, info, instrument};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

/// A parsed table: column names plus rows of cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Name of the row-key column, always stored first once set.
    index: Option<String>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(columns.len());
        let mut columns = columns;
        columns.extend((columns.len()..width).map(|i| i.to_string()));
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            columns,
            rows,
            index: None,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Replace every column name. The number of names must equal the number
    /// of columns.
    pub fn rename_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ScrapeError> {
        if names.len() != self.columns.len() {
            return Err(ScrapeError::StructuralAssumption(format!(
                "table has {} columns, expected {}",
                self.columns.len(),
                names.len()
            )));
        }
        self.columns = names.iter().map(|n| n.as_ref().to_string()).collect();
        if self.index.is_some() {
            self.index = Some(self.columns[0].clone());
        }
        Ok(())
    }

    /// Use column `name` as the row key. The column moves to the front.
    pub fn set_index(&mut self, name: &str) -> Result<(), ScrapeError> {
        let pos = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ScrapeError::StructuralAssumption(format!("no column named {name}")))?;
        if pos != 0 {
            let col = self.columns.remove(pos);
            self.columns.insert(0, col);
            for row in &mut self.rows {
                let cell = row.remove(pos);
                row.insert(0, cell);
            }
        }
        self.index = Some(name.to_string());
        Ok(())
    }

    /// Render the table as an HTML fragment carrying `classes` next to the
    /// `dataframe` class. Row-key cells are rendered as `<th>`.
    pub fn to_html<S: AsRef<str>>(&self, classes: &[S]) -> String {
        let class_attr = std::iter::once("dataframe")
            .chain(classes.iter().map(AsRef::as_ref))
            .join(" ");
        let mut html = String::new();
        // fmt::Write into a String cannot fail.
        let _ = writeln!(html, r#"<table border="1" class="{}">"#, encode_double_quoted_attribute(&class_attr));
        html.push_str("  <thead>\n");
        html.push_str("    <tr style=\"text-align: right;\">\n");
        html.push_str("      <th></th>\n");
        let value_columns = match self.index {
            Some(_) => &self.columns[1..],
            None => &self.columns[..],
        };
        for col in value_columns {
            let _ = writeln!(html, "      <th>{}</th>", encode_text(col));
        }
        html.push_str("    </tr>\n");
        if let Some(index) = &self.index {
            html.push_str("    <tr>\n");
            let _ = writeln!(html, "      <th>{}</th>", encode_text(index));
            for _ in value_columns {
                html.push_str("      <th></th>\n");
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </thead>\n");
        html.push_str("  <tbody>\n");
        for (i, row) in self.rows.iter().enumerate() {
            html.push_str("    <tr>\n");
            let values = match self.index {
                Some(_) => {
                    let _ = writeln!(html, "      <th>{}</th>", encode_text(&row[0]));
                    &row[1..]
                }
                None => {
                    let _ = writeln!(html, "      <th>{i}</th>");
                    &row[..]
                }
            };
            for value in values {
                let _ = writeln!(html, "      <td>{}</td>", encode_text(value));
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n");
        html.push_str("</table>");
        html
    }
}

/// Fetch `url` and parse every table on the page, in document order.
///
/// # Errors
///
/// Fails on transport errors, non-success status codes, or a page that
/// contains no table at all.
#[instrument(level = "info", skip(client))]
pub async fn fetch_tables(client: &Client, url: &str) -> Result<Vec<Table>, ScrapeError> {
    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    let tables = parse_tables(&body);
    if tables.is_empty() {
        return Err(ScrapeError::StructuralAssumption(format!("no tables found at {url}")));
    }
    info!(count = tables.len(), bytes = body.len(), "Parsed tables");
    Ok(tables)
}

/// Parse every `<table>` in `html`.
pub fn parse_tables(html: &str) -> Vec<Table> {
    let document = Html::parse_document(html);
    document.select(&TABLE).map(parse_table).collect()
}

fn parse_table(table: ElementRef<'_>) -> Table {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    let own_rows = table.select(&ROW).filter(|tr| owning_table(*tr) == Some(table));
    for (i, tr) in own_rows.enumerate() {
        let cells: Vec<ElementRef<'_>> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "th" | "td"))
            .collect();
        if cells.is_empty() {
            continue;
        }
        let texts: Vec<String> = cells
            .iter()
            .map(|c| normalize_text(&c.text().collect::<String>()))
            .collect();

        let in_thead = tr
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|a| a.value().name() != "table")
            .any(|a| a.value().name() == "thead");
        let all_th = cells.iter().all(|c| c.value().name() == "th");

        if header.is_none() && (in_thead || (i == 0 && all_th)) {
            header = Some(texts);
        } else if !in_thead {
            rows.push(texts);
        }
    }

    debug!(columns = header.as_ref().map(Vec::len), rows = rows.len(), "Parsed table");
    Table::new(header.unwrap_or_default(), rows)
}

/// Nearest enclosing `<table>` of a row.
fn owning_table(tr: ElementRef<'_>) -> Option<ElementRef<'_>> {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}
