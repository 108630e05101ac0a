use crate::config::settings::DefaultFields;
use crate::errors::{BulkError, Result};
use crate::input::reader::Table;
use std::collections::{BTreeMap, HashMap};

/// One CSV record keyed by its (renamed) column header.
pub type Row = BTreeMap<String, String>;

const TRIM_CHARS: &[char] = &[' ', '\n', '\r'];

pub fn trim_cell(value: &str) -> &str {
    value.trim_matches(TRIM_CHARS)
}

/// Replaces every header found in `renames` with its target name.
pub fn rename_headers(headers: &[String], renames: &HashMap<String, String>) -> Vec<String> {
    headers
        .iter()
        .map(|header| renames.get(header).unwrap_or(header).clone())
        .collect()
}

/// Pairs each header with the cell at the same position.
///
/// `line` is only used for the error message when the record and the header
/// disagree on the number of columns.
pub fn build_row(headers: &[String], record: &[String], line: u64) -> Result<Row> {
    if record.len() != headers.len() {
        return Err(BulkError::ColumnCountMismatch {
            line,
            expected: headers.len(),
            found: record.len(),
        });
    }

    Ok(headers
        .iter()
        .zip(record)
        .map(|(header, cell)| (header.clone(), trim_cell(cell).to_string()))
        .collect())
}

/// Fills missing or empty default-able fields from `defaults`.
pub fn apply_defaults(row: &mut Row, defaults: &DefaultFields) {
    for (field, default) in defaults.by_field() {
        let value = row.entry(field.to_string()).or_default();
        if value.is_empty() {
            *value = default.to_string();
        }
    }
}

pub fn normalize(
    table: &Table,
    renames: &HashMap<String, String>,
    defaults: &DefaultFields,
) -> Result<Vec<Row>> {
    let headers = rename_headers(&table.headers, renames);

    table
        .records
        .iter()
        .map(|record| {
            let mut row = build_row(&headers, &record.cells, record.line)?;
            apply_defaults(&mut row, defaults);
            Ok(row)
        })
        .collect()
}
