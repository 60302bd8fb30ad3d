//! Error types for data-portal.

use crate::dataframe::DataType;

/// Result type alias for data-portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

/// All errors produced by data-portal operations.
///
/// "Not applicable" outcomes (e.g. correlation with fewer than two numeric
/// columns) are not errors; they are reported through the result types.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// A referenced column is not present in the DataFrame.
    #[error("column '{name}' not found")]
    InvalidColumn { name: String },

    /// A required parameter is missing or empty.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The operation needs a different column type.
    #[error("column '{column}' is {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    /// Aggregation operator outside the supported set.
    #[error("unsupported aggregation operator '{operator}'")]
    UnsupportedOperator { operator: String },

    /// A column with this name already exists.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// Column length does not match the DataFrame row count.
    #[error("expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Delimited input could not be split into a rectangular table.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: u64, message: String },

    /// Error raised by the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error during file reading or export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    pub(crate) fn invalid_column(name: &str) -> Self {
        Self::InvalidColumn {
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
