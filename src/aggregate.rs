//! Group-by aggregation.
//!
//! [`group_aggregate`] merges rows that share the same values across all
//! group keys and reduces a numeric target column with one [`AggOp`].
//!
//! - A missing key value is its own group, never dropped.
//! - Missing target values are skipped. A group whose targets are all
//!   missing yields `None` for every operator except `count`, which
//!   yields 0.
//! - Output rows are sorted ascending by key tuple, first key first, so
//!   identical input always produces identical output.
//!
//! # Example
//!
//! ```
//! use data_portal::aggregate::{group_aggregate, AggOp, GroupByParams};
//! use data_portal::dataframe::{Column, DataFrame, Value};
//!
//! let df = DataFrame::from_columns([
//!     ("region", Column::from_texts([Some("west"), Some("east"), Some("east")])),
//!     ("sales", Column::from_numbers([Some(30.0), Some(10.0), Some(20.0)])),
//! ])
//! .unwrap();
//!
//! let params = GroupByParams::new(["region"], "sales", AggOp::Sum);
//! let result = group_aggregate(&df, &params).unwrap();
//! assert_eq!(result.value_name, "sales_sum");
//! assert_eq!(result.rows[0].keys, vec![Value::Text("east".into())]);
//! assert_eq!(result.rows[0].value, Some(30.0));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataframe::{Column, DataFrame, DataType, Value};
use crate::error::{PortalError, Result};
use crate::missing::{missing_policy, Engine};

// ── Operators ─────────────────────────────────────────────────────────

/// Reduction applied to the target column of each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AggOp {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    Median,
}

impl AggOp {
    /// All supported operators.
    pub const ALL: [AggOp; 6] = [
        Self::Sum,
        Self::Mean,
        Self::Min,
        Self::Max,
        Self::Count,
        Self::Median,
    ];

    /// Lower-case operator name, used in the result column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Median => "median",
        }
    }

    /// Reduces the observed values of one group.
    fn apply(self, observed: &[f64]) -> Option<f64> {
        match self {
            Self::Count => Some(observed.len() as f64),
            Self::Sum => (!observed.is_empty()).then(|| observed.iter().sum()),
            Self::Mean => u_numflow::stats::mean(observed),
            Self::Min => u_numflow::stats::min(observed),
            Self::Max => u_numflow::stats::max(observed),
            Self::Median => u_numflow::stats::median(observed),
        }
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggOp {
    type Err = PortalError;

    /// Parses an operator name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| PortalError::UnsupportedOperator {
                operator: s.to_string(),
            })
    }
}

impl TryFrom<String> for AggOp {
    type Error = PortalError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AggOp> for String {
    fn from(op: AggOp) -> Self {
        op.name().to_string()
    }
}

// ── Request / result ──────────────────────────────────────────────────

/// Group-by request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByParams {
    /// Group-key columns, primary key first.
    pub keys: Vec<String>,
    /// Numeric column to reduce.
    pub target: String,
    /// Reduction operator.
    pub operator: AggOp,
}

impl GroupByParams {
    pub fn new<K: Into<String>>(
        keys: impl IntoIterator<Item = K>,
        target: impl Into<String>,
        operator: AggOp,
    ) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            target: target.into(),
            operator,
        }
    }
}

/// One output group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRow {
    /// Key values, in the order of [`AggregationResult::key_names`].
    pub keys: Vec<Value>,
    /// Aggregated value; `None` when undefined.
    pub value: Option<f64>,
}

/// Result of [`group_aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Group-key column names.
    pub key_names: Vec<String>,
    /// Name of the aggregated column, `{target}_{operator}`.
    pub value_name: String,
    /// Groups, ascending by key tuple.
    pub rows: Vec<AggregationRow>,
}

impl AggregationResult {
    /// Serializes the result as UTF-8 CSV for download.
    ///
    /// The header is the key names followed by the value column name.
    /// Missing keys and undefined values become empty fields; numbers use
    /// the shortest decimal form that round-trips.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(
            self.key_names
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(self.value_name.as_str())),
        )?;
        for row in &self.rows {
            let mut record: Vec<String> = row.keys.iter().map(Value::to_string).collect();
            record.push(row.value.map(|v| Value::number(v).to_string()).unwrap_or_default());
            writer.write_record(&record)?;
        }
        writer
            .into_inner()
            .map_err(|e| PortalError::Io(e.into_error()))
    }
}

// ── Aggregation ───────────────────────────────────────────────────────

/// Groups rows by `params.keys` and reduces `params.target`.
///
/// # Errors
///
/// - [`PortalError::InvalidInput`] if no keys are given or a key repeats
/// - [`PortalError::InvalidColumn`] if a key or the target is unknown
/// - [`PortalError::TypeMismatch`] if the target is not numeric
pub fn group_aggregate(df: &DataFrame, params: &GroupByParams) -> Result<AggregationResult> {
    if params.keys.is_empty() {
        return Err(PortalError::invalid_input("at least one group key is required"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = params.keys.iter().find(|k| !seen.insert(k.as_str())) {
        return Err(PortalError::invalid_input(format!(
            "group key '{dup}' listed more than once"
        )));
    }

    let key_cols: Vec<&Column> = params
        .keys
        .iter()
        .map(|k| df.require_column(k))
        .collect::<Result<_>>()?;
    let target = df.require_column(&params.target)?;
    if target.data_type() != DataType::Numeric {
        return Err(PortalError::TypeMismatch {
            column: params.target.clone(),
            expected: DataType::Numeric,
            actual: target.data_type(),
        });
    }

    let key_policy = missing_policy(Engine::GroupKey);
    let target_policy = missing_policy(Engine::GroupTarget);

    // Ordered map: iteration yields groups ascending by key tuple.
    let mut groups: BTreeMap<Vec<Value>, Vec<f64>> = BTreeMap::new();
    'rows: for row in 0..df.row_count() {
        let mut key = Vec::with_capacity(key_cols.len());
        for col in &key_cols {
            if !key_policy.admits(col.is_missing(row)) {
                continue 'rows;
            }
            key.push(col.value(row));
        }
        let observed = groups.entry(key).or_default();
        if target_policy.admits(target.is_missing(row)) {
            if let Some(v) = target.number_at(row) {
                observed.push(v);
            }
        }
    }

    let rows: Vec<AggregationRow> = groups
        .into_iter()
        .map(|(keys, observed)| AggregationRow {
            keys,
            value: params.operator.apply(&observed),
        })
        .collect();

    log::debug!(
        "grouped {} rows by {:?} into {} groups ({} of '{}')",
        df.row_count(),
        params.keys,
        rows.len(),
        params.operator,
        params.target
    );
    Ok(AggregationResult {
        key_names: params.keys.clone(),
        value_name: format!("{}_{}", params.target, params.operator),
        rows,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
