//! Value counts for a single column.
//!
//! Missing cells form their own category (shown as [`Value::Missing`]), so
//! the counts of an untruncated table always add up to the row count.
//! Entries are ordered by count descending; equal counts keep the order in
//! which the values first appear, which makes repeated calls on identical
//! input return identical tables.
//!
//! ```
//! use data_portal::dataframe::{Column, DataFrame, Value};
//! use data_portal::frequency::{value_counts, ValueCountsParams};
//!
//! let df = DataFrame::from_columns([(
//!     "region",
//!     Column::from_texts([Some("east"), Some("east"), Some("west")]),
//! )])
//! .unwrap();
//!
//! let table = value_counts(&df, &ValueCountsParams::new("region", 1)).unwrap();
//! assert_eq!(table.entries.len(), 1);
//! assert_eq!(table.entries[0].value, Value::Text("east".into()));
//! assert_eq!(table.entries[0].count, 2);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataframe::{DataFrame, Value};
use crate::error::Result;
use crate::missing::{missing_policy, Engine};

/// Value-count request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCountsParams {
    /// Column to count.
    pub column: String,
    /// Number of entries to keep. Default: 5.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}

impl ValueCountsParams {
    pub fn new(column: impl Into<String>, top_n: usize) -> Self {
        Self {
            column: column.into(),
            top_n,
        }
    }
}

/// One distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: Value,
    pub count: usize,
}

/// Result of [`value_counts`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    /// Counted column.
    pub column: String,
    /// Rows in the source column, the denominator of [`share`](Self::share).
    pub row_count: usize,
    /// Distinct values before truncation.
    pub distinct_count: usize,
    /// Top entries, count descending.
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Sum of the counts of the kept entries.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Fraction of all rows taken by entry `idx`.
    pub fn share(&self, idx: usize) -> Option<f64> {
        let entry = self.entries.get(idx)?;
        (self.row_count > 0).then(|| entry.count as f64 / self.row_count as f64)
    }
}

/// Counts the distinct values of one column and keeps the top N.
///
/// `top_n` is clamped to `[1, distinct]`; asking for more entries than
/// there are distinct values returns all of them.
///
/// # Errors
///
/// [`PortalError::InvalidColumn`](crate::error::PortalError::InvalidColumn)
/// if the column does not exist.
pub fn value_counts(df: &DataFrame, params: &ValueCountsParams) -> Result<FrequencyTable> {
    let col = df.require_column(&params.column)?;
    let policy = missing_policy(Engine::ValueCounts);

    // Entries in first-appearance order; `slots` maps a value to its entry.
    let mut slots: HashMap<Value, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    for row in 0..col.len() {
        if !policy.admits(col.is_missing(row)) {
            continue;
        }
        let value = col.value(row);
        match slots.get(&value) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                slots.insert(value.clone(), entries.len());
                entries.push(FrequencyEntry { value, count: 1 });
            }
        }
    }

    let distinct_count = entries.len();
    // Stable sort keeps first-appearance order among equal counts
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    let keep = params.top_n.clamp(1, distinct_count.max(1));
    entries.truncate(keep);

    log::debug!(
        "value counts for '{}': {distinct_count} distinct, kept {}",
        params.column,
        entries.len()
    );
    Ok(FrequencyTable {
        column: params.column.clone(),
        row_count: col.len(),
        distinct_count,
        entries,
    })
}
