//! Delimited-text ingestion with automatic type inference.
//!
//! Parses CSV (or any single-byte delimited text) into a
//! [`DataFrame`](crate::dataframe::DataFrame). Each column's type is
//! decided once by [`infer_data_type`](crate::schema::infer_data_type).
//!
//! # Features
//!
//! - RFC 4180 quoting via the `csv` crate (quoted fields, escaped quotes, embedded newlines)
//! - Standard null markers recognized: empty, `NA`, `N/A`, `null`, `NULL`, `None`, `.`, `NaN`, `#N/A`
//! - Surrounding whitespace trimmed before inference
//! - Configurable delimiter, header row and null markers
//!
//! # Example
//!
//! ```
//! use data_portal::csv_parser::CsvParser;
//! use data_portal::dataframe::DataType;
//!
//! let csv = "name,value,active\nAlice,1.5,true\nBob,2.3,false\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(df.row_count(), 2);
//! assert_eq!(df.column(0).unwrap().data_type(), DataType::Text);
//! assert_eq!(df.column(1).unwrap().data_type(), DataType::Numeric);
//! assert_eq!(df.column(2).unwrap().data_type(), DataType::Boolean);
//! ```

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::dataframe::{Column, DataFrame, DataType, ValidityBitmap};
use crate::error::{PortalError, Result};
use crate::schema::{infer_data_type, parse_boolean, parse_datetime};

/// Standard null value markers recognized during parsing.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", ".", "NaN", "nan", "NAN",
    "#N/A", "#NA",
];

/// CSV parser configuration and entry point.
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

impl CsvParser {
    /// Creates a parser with default settings (comma delimiter, header row, standard null markers).
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Sets the field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Sets whether the first row is a header (default: true).
    pub fn has_header(mut self, header: bool) -> Self {
        self.has_header = header;
        self
    }

    /// Sets custom null markers (replaces defaults).
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses a CSV string into a DataFrame.
    pub fn parse_str(&self, input: &str) -> Result<DataFrame> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        self.parse_reader(input.as_bytes())
    }

    /// Parses a CSV file from disk into a DataFrame.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parses CSV from any reader into a DataFrame.
    ///
    /// A header without data rows yields zero-row columns; empty input
    /// yields an empty DataFrame.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<DataFrame> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = reader.records();
        let first = match records.next() {
            None => return Ok(DataFrame::new()),
            Some(first) => first?,
        };

        if self.has_header {
            let headers = first.iter().map(|h| h.trim().to_string()).collect();
            self.build_frame(headers, records)
        } else {
            let headers = (0..first.len()).map(|i| format!("col_{i}")).collect();
            self.build_frame(headers, std::iter::once(Ok(first)).chain(records))
        }
    }

    // ── Internal ─────────────────────────────────────────────────

    fn build_frame(
        &self,
        headers: Vec<String>,
        records: impl Iterator<Item = csv::Result<StringRecord>>,
    ) -> Result<DataFrame> {
        let n_cols = headers.len();
        let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); n_cols];

        for record in records {
            let record = record?;
            // Blank lines are skipped by the reader; a lone empty field is a blank row too
            if record.len() == 1 && record[0].trim().is_empty() && n_cols > 1 {
                continue;
            }
            if record.len() != n_cols {
                let line = record.position().map_or(0, |p| p.line());
                return Err(PortalError::CsvParse {
                    line,
                    message: format!("expected {n_cols} fields, got {}", record.len()),
                });
            }
            for (col_idx, field) in record.iter().enumerate() {
                raw_columns[col_idx].push(field.trim().to_string());
            }
        }

        let mut df = DataFrame::new();
        for (name, raw) in headers.into_iter().zip(raw_columns) {
            let column = self.build_column(&raw);
            df.add_column(name, column)?;
        }
        log::debug!(
            "parsed CSV into {} rows x {} columns",
            df.row_count(),
            df.column_count()
        );
        Ok(df)
    }

    /// Checks if a trimmed value is a null marker.
    fn is_null(&self, value: &str) -> bool {
        self.null_markers.iter().any(|m| m == value)
    }

    /// Infers the column type and builds a typed Column.
    fn build_column(&self, raw: &[String]) -> Column {
        let cells: Vec<Option<&str>> = raw
            .iter()
            .map(|s| (!self.is_null(s)).then_some(s.as_str()))
            .collect();
        let observed: Vec<&str> = cells.iter().flatten().copied().collect();
        let validity: ValidityBitmap = cells.iter().map(Option::is_some).collect();

        match infer_data_type(&observed) {
            DataType::Numeric => Column::numeric(
                cells
                    .iter()
                    .map(|c| c.and_then(|s| s.parse().ok()).unwrap_or(0.0))
                    .collect(),
                validity,
            ),
            DataType::Boolean => Column::boolean(
                cells
                    .iter()
                    .map(|c| c.and_then(parse_boolean).unwrap_or(false))
                    .collect(),
                validity,
            ),
            DataType::Datetime => Column::datetime(
                cells
                    .iter()
                    .map(|c| c.and_then(parse_datetime).unwrap_or_default())
                    .collect(),
                validity,
            ),
            DataType::Text => Column::text(
                cells
                    .iter()
                    .map(|c| c.map(str::to_string).unwrap_or_default())
                    .collect(),
                validity,
            ),
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::Value;

    // ── Basic CSV parsing ────────────────────────────────────────

    #[test]
    fn parse_simple_csv() {
        let csv = "a,b,c\n1,2,3\n4,5,6\n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column_count(), 3);
        assert_eq!(df.column_names(), &["a", "b", "c"]);
    }

    #[test]
    fn parse_mixed_types() {
        let csv = "id,region,active,day\n1,east,true,2024-01-05\n2,west,false,2024-01-06\n3,east,yes,2024-01-07\n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        assert_eq!(
            df.schema(),
            vec![
                ("id", DataType::Numeric),
                ("region", DataType::Text),
                ("active", DataType::Boolean),
                ("day", DataType::Datetime)
            ]
        );
        let active = df.column_by_name("active").unwrap();
        assert_eq!(active.value(2), Value::Boolean(true));
    }

    // ── Null handling ────────────────────────────────────────────

    #[test]
    fn parse_null_markers() {
        let csv = "x,y\n1.0,a\nNA,b\n3.0,c\n,d\n5.0,e\nnull,f\n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.data_type(), DataType::Numeric);
        assert_eq!(x.null_count(), 3);
        assert!(x.is_missing(1));
        assert!(x.is_missing(3));
        assert!(x.is_missing(5));
        assert_eq!(x.observed_numbers(), Some(vec![1.0, 3.0, 5.0]));
    }

    #[test]
    fn all_null_column_defaults_to_numeric() {
        let csv = "x,y\nNA,1\nnull,2\n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.data_type(), DataType::Numeric);
        assert_eq!(x.null_count(), 2);
    }

    #[test]
    fn custom_null_markers() {
        let csv = "x\n1.0\n-999\n3.0\n";
        let df = CsvParser::new()
            .null_markers(vec!["-999".to_string()])
            .parse_str(csv)
            .unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.null_count(), 1);
        assert!(x.is_missing(1));
    }

    // ── Quoting and line endings ─────────────────────────────────

    #[test]
    fn parse_quoted_fields() {
        let csv = "name,desc\nAlice,\"hello, world\"\nBob,\"line1\nline2\"\n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        assert_eq!(df.row_count(), 2);
        let desc = df.column_by_name("desc").unwrap();
        assert_eq!(desc.value(0), Value::Text("hello, world".into()));
        assert_eq!(desc.value(1), Value::Text("line1\nline2".into()));
    }

    #[test]
    fn parse_crlf_and_bom() {
        let csv = "\u{feff}a,b\r\n1,2\r\n3,4\r\n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        assert_eq!(df.column_names(), &["a", "b"]);
        let a = df.column_by_name("a").unwrap();
        assert_eq!(a.as_numeric().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn numeric_with_surrounding_spaces() {
        let csv = "x\n  1.5  \n  2.3  \n";
        let df = CsvParser::new().parse_str(csv).unwrap();
        let x = df.column_by_name("x").unwrap();
        assert_eq!(x.as_numeric().unwrap(), &[1.5, 2.3]);
    }

    // ── Edge cases ───────────────────────────────────────────────

    #[test]
    fn parse_empty_csv() {
        let df = CsvParser::new().parse_str("").unwrap();
        assert_eq!(df.row_count(), 0);
        assert_eq!(df.column_count(), 0);
    }

    #[test]
    fn header_only_keeps_columns() {
        let df = CsvParser::new().parse_str("a,b,c\n").unwrap();
        assert_eq!(df.row_count(), 0);
        assert_eq!(df.column_names(), &["a", "b", "c"]);
    }

    #[test]
    fn ragged_row_is_an_error() {
        let err = CsvParser::new().parse_str("a,b\n1,2\n3\n").unwrap_err();
        match err {
            PortalError::CsvParse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("expected 2 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_header_is_an_error() {
        let err = CsvParser::new().parse_str("a,a\n1,2\n").unwrap_err();
        assert!(matches!(err, PortalError::DuplicateColumn { .. }));
    }

    #[test]
    fn parse_without_header() {
        let df = CsvParser::new().has_header(false).parse_str("1,2\n3,4\n").unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column_names(), &["col_0", "col_1"]);
    }

    #[test]
    fn parse_semicolon_delimiter() {
        let df = CsvParser::new()
            .delimiter(b';')
            .parse_str("a;b\n1;2\n3;4\n")
            .unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column_names(), &["a", "b"]);
    }

    #[test]
    fn parse_file_missing_path() {
        let err = CsvParser::new()
            .parse_file("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, PortalError::Io(_)));
    }
}
