//! Schema inspection and column type inference.
//!
//! [`infer_data_type`] decides the type of a raw text column once, at load
//! time. [`inspect`] reports the shape, types and missing counts of a
//! loaded [`DataFrame`].
//!
//! Inference priority: Numeric → Boolean → Datetime → Text.
//!
//! ```
//! use data_portal::csv_parser::CsvParser;
//! use data_portal::dataframe::DataType;
//! use data_portal::schema::inspect;
//!
//! let csv = "day,temp,ok\n2024-01-01,20.5,true\n2024-01-02,NA,false\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! let report = inspect(&df);
//!
//! assert_eq!(report.row_count, 2);
//! assert_eq!(report.column_count, 3);
//! assert_eq!(report.columns[0].data_type, DataType::Datetime);
//! assert_eq!(report.columns[1].null_count, 1);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::dataframe::{DataFrame, DataType};

/// Date-time patterns tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only patterns tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

// ── Type inference ────────────────────────────────────────────────────

/// Infers the most specific type that fits every non-missing value.
///
/// A column without any observed value is numeric. Datetime detection is
/// best effort: if any value fails to match a known pattern the column
/// falls back to text.
///
/// ```
/// use data_portal::dataframe::DataType;
/// use data_portal::schema::infer_data_type;
///
/// assert_eq!(infer_data_type(&["1", "2.5", "-3e2"]), DataType::Numeric);
/// assert_eq!(infer_data_type(&["yes", "No"]), DataType::Boolean);
/// assert_eq!(infer_data_type(&["2024-05-01", "2024/05/02"]), DataType::Datetime);
/// assert_eq!(infer_data_type(&["2024-05-01", "soon"]), DataType::Text);
/// ```
pub fn infer_data_type(observed: &[&str]) -> DataType {
    let data_type = if observed.iter().all(|s| s.parse::<f64>().is_ok()) {
        DataType::Numeric
    } else if observed.iter().all(|s| parse_boolean(s).is_some()) {
        DataType::Boolean
    } else if observed.iter().all(|s| parse_datetime(s).is_some()) {
        DataType::Datetime
    } else {
        DataType::Text
    };
    log::trace!("inferred {data_type} from {} observed values", observed.len());
    data_type
}

/// Parses a true/false token (`true/false`, `yes/no`, `t/f`, `y/n`,
/// case-insensitive).
pub fn parse_boolean(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "t" | "y" => Some(true),
        "false" | "no" | "f" | "n" => Some(false),
        _ => None,
    }
}

/// Parses a date or date-time string against the recognized patterns.
///
/// Plain dates are placed at midnight; RFC 3339 timestamps are converted
/// to UTC and stored without offset.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ── Schema report ─────────────────────────────────────────────────────

/// Name, type and missing count of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Type resolved at load time.
    pub data_type: DataType,
    /// Number of missing values.
    pub null_count: usize,
}

/// Shape and per-column schema of a DataFrame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    /// Number of rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// One descriptor per column, in column order.
    pub columns: Vec<ColumnDescriptor>,
}

impl SchemaReport {
    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `(name, type)` pairs in column order.
    pub fn column_types(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type))
            .collect()
    }

    /// `(name, missing count)` pairs in column order.
    pub fn null_counts(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.null_count))
            .collect()
    }

    /// Missing values across all columns.
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }
}

/// Reports shape, column types and missing counts. Never fails.
pub fn inspect(df: &DataFrame) -> SchemaReport {
    let columns: Vec<ColumnDescriptor> = df
        .iter()
        .map(|(name, col)| ColumnDescriptor {
            name: name.to_string(),
            data_type: col.data_type(),
            null_count: col.null_count(),
        })
        .collect();
    log::debug!(
        "inspected {} rows x {} columns",
        df.row_count(),
        columns.len()
    );
    SchemaReport {
        row_count: df.row_count(),
        column_count: df.column_count(),
        columns,
    }
}
