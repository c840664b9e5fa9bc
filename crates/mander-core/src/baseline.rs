//! Baseline transaction feed loaders
//!
//! The live financial-data client lives outside this crate; these loaders read
//! an exported snapshot of it so the view can be built offline.
//!
//! JSON: an array of objects with `id`, `name`, `amount`, `date`
//! (`YYYY-MM-DD`), optional `category` (list of names) and `logo`.
//!
//! CSV: header row `id,name,amount,date,category,logo`; `category` holds
//! names separated by `;`. Column order does not matter, `category` and
//! `logo` may be omitted.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::event::{parse_amount, parse_date};
use crate::models::BaselineTransaction;

/// Separator for multiple categories in a CSV cell
pub const CSV_CATEGORY_SEPARATOR: char = ';';

pub fn load_json<R: Read>(reader: R) -> Result<Vec<BaselineTransaction>> {
    let transactions: Vec<BaselineTransaction> = serde_json::from_reader(reader)?;
    debug!("Parsed {} baseline transactions from JSON", transactions.len());
    Ok(transactions)
}

pub fn load_csv<R: Read>(reader: R) -> Result<Vec<BaselineTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let missing = |name: &str| Error::InvalidData(format!("baseline CSV has no '{}' column", name));

    let id_col = column("id").ok_or_else(|| missing("id"))?;
    let name_col = column("name").ok_or_else(|| missing("name"))?;
    let amount_col = column("amount").ok_or_else(|| missing("amount"))?;
    let date_col = column("date").ok_or_else(|| missing("date"))?;
    let category_col = column("category");
    let logo_col = column("logo");

    let mut transactions = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let row = line + 1;

        let mut tx = BaselineTransaction::new(
            required(&record, id_col, row, "id")?,
            required(&record, name_col, row, "name")?,
            parse_amount(required(&record, amount_col, row, "amount")?)?,
            parse_date(required(&record, date_col, row, "date")?)?,
        );
        tx.category = category_col
            .and_then(|col| record.get(col))
            .map(split_categories)
            .unwrap_or_default();
        tx.logo = logo_col
            .and_then(|col| record.get(col))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        transactions.push(tx);
    }

    debug!("Parsed {} baseline transactions from CSV", transactions.len());
    Ok(transactions)
}

/// Load by file extension: `.json` or `.csv`
pub fn load_file(path: &Path) -> Result<Vec<BaselineTransaction>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let reader = BufReader::new(File::open(path)?);

    match extension.as_deref() {
        Some("json") => load_json(reader),
        Some("csv") => load_csv(reader),
        _ => Err(Error::InvalidData(format!(
            "unsupported baseline format: {} (expected .json or .csv)",
            path.display()
        ))),
    }
}

fn cell(record: &StringRecord, col: usize) -> Option<&str> {
    record.get(col).map(str::trim).filter(|s| !s.is_empty())
}

fn required<'r>(record: &'r StringRecord, col: usize, row: usize, name: &str) -> Result<&'r str> {
    cell(record, col).ok_or_else(|| Error::InvalidData(format!("row {}: missing {}", row, name)))
}

fn split_categories(cell: &str) -> Vec<String> {
    cell.split(CSV_CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
