//! Column-major DataFrame for tabular data.
//!
//! The [`DataFrame`] stores named, equal-length columns. Each column is a
//! tagged variant resolved once when the data is loaded, and carries a
//! compact validity bitmap for missing values.
//!
//! # Column Types
//!
//! | Type | Storage | Use case |
//! |------|---------|----------|
//! | [`Numeric`](Column::Numeric) | `Vec<f64>` + bitmap | Continuous/integer values |
//! | [`Boolean`](Column::Boolean) | `Vec<bool>` + bitmap | True/false values |
//! | [`Text`](Column::Text) | `Vec<String>` + bitmap | Free-form strings |
//! | [`Datetime`](Column::Datetime) | `Vec<NaiveDateTime>` + bitmap | Dates and timestamps |
//!
//! # Example
//!
//! ```
//! use data_portal::dataframe::{Column, DataFrame};
//!
//! let mut df = DataFrame::new();
//! df.add_column("region", Column::from_texts([Some("east"), Some("west"), None]))
//!     .unwrap();
//! df.add_column("sales", Column::from_numbers([Some(10.0), Some(20.0), Some(30.0)]))
//!     .unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.column_count(), 2);
//! assert_eq!(df.total_null_count(), 1);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{PortalError, Result};
use crate::missing;

/// Display format for datetime cells and exported keys.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ── ValidityBitmap ────────────────────────────────────────────────────

/// Bit-packed validity bitmap, one bit per row.
///
/// A set bit marks an observed value, a clear bit a missing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityBitmap {
    words: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Creates a bitmap where all `len` positions are valid.
    pub fn all_valid(len: usize) -> Self {
        let mut words = vec![u64::MAX; len.div_ceil(64)];
        if let Some(last) = words.last_mut() {
            let tail = len % 64;
            if tail != 0 {
                *last = (1u64 << tail) - 1;
            }
        }
        Self { words, len }
    }

    /// Creates a bitmap where all `len` positions are missing.
    pub fn all_invalid(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Creates an empty bitmap with no rows.
    pub fn empty() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
        }
    }

    /// Returns `true` if the value at `idx` is observed.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.words[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks position `idx` as missing.
    #[inline]
    pub fn set_invalid(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        self.words[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Appends one position.
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.words.len() {
            self.words.push(0);
        }
        if valid {
            self.words[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Returns the number of tracked positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bitmap tracks zero positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counts the observed positions.
    pub fn valid_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Counts the missing positions.
    pub fn null_count(&self) -> usize {
        self.len - self.valid_count()
    }

    /// Iterates over the indices of observed positions.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.is_valid(i))
    }
}

impl FromIterator<bool> for ValidityBitmap {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bitmap = Self::empty();
        for valid in iter {
            bitmap.push(valid);
        }
        bitmap
    }
}

// ── DataType ──────────────────────────────────────────────────────────

/// Semantic data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    /// Continuous or integer numeric values (stored as `f64`).
    Numeric,
    /// Boolean (true/false) values.
    Boolean,
    /// Free-form text.
    Text,
    /// Calendar dates and timestamps.
    Datetime,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Text => write!(f, "Text"),
            Self::Datetime => write!(f, "Datetime"),
        }
    }
}

// ── Value ─────────────────────────────────────────────────────────────

/// An owned cell value, used as a frequency category and a group key.
///
/// Ordering is total: values of the same kind compare naturally (numbers
/// by IEEE total order), and [`Value::Missing`] sorts after every
/// observed value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    Text(String),
    Datetime(NaiveDateTime),
    Missing,
}

impl Value {
    /// Creates a numeric value, folding `-0.0` into `0.0`.
    pub fn number(v: f64) -> Self {
        Self::Number(if v == 0.0 { 0.0 } else { v })
    }

    /// Returns `true` for [`Value::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Boolean(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
            Self::Datetime(_) => 3,
            Self::Missing => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Datetime(a), Self::Datetime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Boolean(b) => b.hash(state),
            Self::Number(v) => v.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
            Self::Datetime(dt) => dt.hash(state),
            Self::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    /// Missing values render as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Datetime(dt) => write!(f, "{}", dt.format(DATETIME_DISPLAY_FORMAT)),
            Self::Missing => Ok(()),
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with a validity bitmap for missing values.
///
/// Missing positions hold a placeholder (0.0, false, empty string, Unix
/// epoch) that must be ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values. A valid `NaN` is still treated as missing.
    Numeric {
        values: Vec<f64>,
        validity: ValidityBitmap,
    },
    /// Boolean values.
    Boolean {
        values: Vec<bool>,
        validity: ValidityBitmap,
    },
    /// Free-form text.
    Text {
        values: Vec<String>,
        validity: ValidityBitmap,
    },
    /// Timestamps without time zone; plain dates sit at midnight.
    Datetime {
        values: Vec<NaiveDateTime>,
        validity: ValidityBitmap,
    },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>, validity: ValidityBitmap) -> Self {
        Self::Numeric { values, validity }
    }

    /// Creates a boolean column.
    pub fn boolean(values: Vec<bool>, validity: ValidityBitmap) -> Self {
        Self::Boolean { values, validity }
    }

    /// Creates a text column.
    pub fn text(values: Vec<String>, validity: ValidityBitmap) -> Self {
        Self::Text { values, validity }
    }

    /// Creates a datetime column.
    pub fn datetime(values: Vec<NaiveDateTime>, validity: ValidityBitmap) -> Self {
        Self::Datetime { values, validity }
    }

    /// Builds a numeric column where `None` marks a missing value.
    pub fn from_numbers(cells: impl IntoIterator<Item = Option<f64>>) -> Self {
        let (values, validity) = split_cells(cells);
        Self::numeric(values, validity)
    }

    /// Builds a boolean column where `None` marks a missing value.
    pub fn from_bools(cells: impl IntoIterator<Item = Option<bool>>) -> Self {
        let (values, validity) = split_cells(cells);
        Self::boolean(values, validity)
    }

    /// Builds a text column where `None` marks a missing value.
    pub fn from_texts<S: Into<String>>(cells: impl IntoIterator<Item = Option<S>>) -> Self {
        let (values, validity) = split_cells(cells.into_iter().map(|c| c.map(Into::into)));
        Self::text(values, validity)
    }

    /// Builds a datetime column where `None` marks a missing value.
    pub fn from_datetimes(cells: impl IntoIterator<Item = Option<NaiveDateTime>>) -> Self {
        let (values, validity) = split_cells(cells);
        Self::datetime(values, validity)
    }

    /// Returns the data type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Boolean { .. } => DataType::Boolean,
            Self::Text { .. } => DataType::Text,
            Self::Datetime { .. } => DataType::Datetime,
        }
    }

    /// Returns the number of rows in this column.
    pub fn len(&self) -> usize {
        self.validity().len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        match self {
            Self::Numeric { validity, .. }
            | Self::Boolean { validity, .. }
            | Self::Text { validity, .. }
            | Self::Datetime { validity, .. } => validity,
        }
    }

    /// Returns `true` if the cell at `idx` is missing.
    pub fn is_missing(&self, idx: usize) -> bool {
        missing::is_missing(self, idx)
    }

    /// Returns the number of missing values.
    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Returns the number of observed values.
    pub fn valid_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Returns the raw numeric values, or `None` if not a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Returns the observed value at `idx` of a numeric column.
    pub fn number_at(&self, idx: usize) -> Option<f64> {
        match self {
            Self::Numeric { values, .. } if !self.is_missing(idx) => Some(values[idx]),
            _ => None,
        }
    }

    /// Returns the observed numeric values (missing excluded), or `None`
    /// if not a numeric column.
    pub fn observed_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { .. } => {
                Some((0..self.len()).filter_map(|i| self.number_at(i)).collect())
            }
            _ => None,
        }
    }

    /// Returns the cell at `idx` as an owned [`Value`].
    pub fn value(&self, idx: usize) -> Value {
        if self.is_missing(idx) {
            return Value::Missing;
        }
        match self {
            Self::Numeric { values, .. } => Value::number(values[idx]),
            Self::Boolean { values, .. } => Value::Boolean(values[idx]),
            Self::Text { values, .. } => Value::Text(values[idx].clone()),
            Self::Datetime { values, .. } => Value::Datetime(values[idx]),
        }
    }

    /// Returns a new column holding the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Self {
        let validity: ValidityBitmap = indices.iter().map(|&i| self.validity().is_valid(i)).collect();
        match self {
            Self::Numeric { values, .. } => {
                Self::numeric(indices.iter().map(|&i| values[i]).collect(), validity)
            }
            Self::Boolean { values, .. } => {
                Self::boolean(indices.iter().map(|&i| values[i]).collect(), validity)
            }
            Self::Text { values, .. } => {
                Self::text(indices.iter().map(|&i| values[i].clone()).collect(), validity)
            }
            Self::Datetime { values, .. } => {
                Self::datetime(indices.iter().map(|&i| values[i]).collect(), validity)
            }
        }
    }
}

fn split_cells<T: Default>(cells: impl IntoIterator<Item = Option<T>>) -> (Vec<T>, ValidityBitmap) {
    let mut values = Vec::new();
    let mut validity = ValidityBitmap::empty();
    for cell in cells {
        validity.push(cell.is_some());
        values.push(cell.unwrap_or_default());
    }
    (values, validity)
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Column-major tabular data structure.
///
/// All columns have the same number of rows and unique names. Engines only
/// ever borrow a DataFrame immutably, so one instance can be shared by
/// concurrent readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame with no columns or rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a DataFrame from `(name, column)` pairs.
    pub fn from_columns<N: Into<String>>(
        columns: impl IntoIterator<Item = (N, Column)>,
    ) -> Result<Self> {
        let mut df = Self::new();
        for (name, column) in columns {
            df.add_column(name, column)?;
        }
        Ok(df)
    }

    /// Adds a named column.
    ///
    /// Fails if the name is already taken or the column length doesn't
    /// match the existing row count (unless this is the first column).
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(PortalError::DuplicateColumn { name });
        }
        let col_len = column.len();
        if self.columns.is_empty() {
            self.row_count = col_len;
        } else if col_len != self.row_count {
            return Err(PortalError::DimensionMismatch {
                expected: self.row_count,
                actual: col_len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns a reference to the column at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns a reference to the column with the given `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Like [`column_by_name`](Self::column_by_name) but fails with
    /// [`PortalError::InvalidColumn`].
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column_by_name(name)
            .ok_or_else(|| PortalError::invalid_column(name))
    }

    /// Returns the index of the column with the given `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns an iterator over (name, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(|s| s.as_str()).zip(self.columns.iter())
    }

    /// Returns an iterator over the numeric columns only.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.iter()
            .filter(|(_, col)| col.data_type() == DataType::Numeric)
    }

    /// Returns a summary of column data types.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.iter().map(|(name, col)| (name, col.data_type())).collect()
    }

    /// Returns the total number of missing values across all columns.
    pub fn total_null_count(&self) -> usize {
        self.columns.iter().map(|c| c.null_count()).sum()
    }

    /// Returns the cells of row `idx`, or `None` if out of range.
    pub fn row(&self, idx: usize) -> Option<Vec<Value>> {
        (idx < self.row_count).then(|| self.columns.iter().map(|c| c.value(idx)).collect())
    }

    /// Returns a new DataFrame with the same columns holding only the rows
    /// at `indices`, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            row_count: indices.len(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
