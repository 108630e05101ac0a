use crate::errors::{BulkError, Result};
use encoding_rs::Encoding;
use std::path::Path;

/// One CSV data record with the line it started on.
#[derive(Debug, Clone)]
pub struct Record {
    pub line: u64,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Reads `path`, decodes it from `encoding` and splits it on `separator`.
pub fn read_table(path: &Path, separator: u8, encoding: &'static Encoding) -> Result<Table> {
    let bytes = std::fs::read(path)
        .map_err(|e| BulkError::InputRead(format!("{}: {}", path.display(), e)))?;

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "input contains byte sequences that are invalid in this encoding"
        );
    }

    parse_table(&text, separator)
}

/// Splits already decoded CSV text. The first record is the header line.
///
/// Records are read flexibly; a record whose length differs from the header
/// is reported later, when the row is built.
pub fn parse_table(text: &str, separator: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let headers = match records.next() {
        Some(header) => header?.iter().map(str::to_string).collect(),
        None => return Err(BulkError::MissingHeader),
    };

    let records = records
        .map(|record| {
            let record = record?;
            Ok(Record {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                cells: record.iter().map(str::to_string).collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Table { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_headers_and_records() {
        let table = parse_table("name,count\nWidget,5\nGadget,6\n", b',').unwrap();

        assert_eq!(table.headers, vec!["name", "count"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].cells, vec!["Widget", "5"]);
        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[1].line, 3);
    }

    #[test]
    fn test_parse_table_custom_separator() {
        let table = parse_table("summary;labels\nWidget;a,b\n", b';').unwrap();

        assert_eq!(table.headers, vec!["summary", "labels"]);
        assert_eq!(table.records[0].cells, vec!["Widget", "a,b"]);
    }

    #[test]
    fn test_parse_table_quoted_multiline_cell() {
        let table = parse_table("summary,description\nWidget,\"line one\nline two\"\nGadget,x\n", b',').unwrap();

        assert_eq!(table.records[0].cells[1], "line one\nline two");
        assert_eq!(table.records[1].line, 4);
    }

    #[test]
    fn test_parse_table_keeps_ragged_records() {
        let table = parse_table("a,b\n1\n", b',').unwrap();
        assert_eq!(table.records[0].cells, vec!["1"]);
    }

    #[test]
    fn test_parse_table_empty_input() {
        assert!(matches!(parse_table("", b','), Err(BulkError::MissingHeader)));
    }

    #[test]
    fn test_read_table_decodes_windows_1252() {
        let path = std::env::temp_dir().join(format!("jira-bulk-create-{}-1252.csv", std::process::id()));
        // "summary\nCaf\xe9\n" in windows-1252
        std::fs::write(&path, b"summary\nCaf\xe9\n").unwrap();

        let table = read_table(&path, b',', encoding_rs::WINDOWS_1252).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(table.records[0].cells, vec!["Café"]);
    }

    #[test]
    fn test_read_table_missing_file() {
        let path = std::env::temp_dir().join("jira-bulk-create-does-not-exist.csv");
        assert!(matches!(
            read_table(&path, b',', encoding_rs::UTF_8),
            Err(BulkError::InputRead(_))
        ));
    }
}
