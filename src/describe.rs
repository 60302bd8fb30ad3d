//! Descriptive statistics and row windows.
//!
//! [`describe`] summarizes every numeric column with count, mean, sample
//! standard deviation, min, quartiles and max. Missing values are skipped;
//! a statistic that cannot be computed from what is left is `None`
//! ("undefined"), never a numeric zero.
//!
//! [`head_rows`] and [`tail_rows`] slice the first or last rows of any
//! DataFrame for display.
//!
//! # Example
//!
//! ```
//! use data_portal::dataframe::{Column, DataFrame};
//! use data_portal::describe::{describe, Statistic};
//!
//! let df = DataFrame::from_columns([
//!     ("x", Column::from_numbers([Some(1.0), Some(2.0), None, Some(4.0)])),
//!     ("label", Column::from_texts([Some("a"), Some("b"), Some("c"), Some("d")])),
//! ])
//! .unwrap();
//!
//! let table = describe(&df);
//! assert_eq!(table.column_names(), vec!["x"]); // text columns are excluded
//! let x = table.summary("x").unwrap();
//! assert_eq!(x.get(Statistic::Count), Some(3.0));
//! assert_eq!(x.get(Statistic::Max), Some(4.0));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataframe::{Column, DataFrame};
use crate::missing::{missing_policy, Engine};

/// Upper bound on the rows returned by [`head_rows`] / [`tail_rows`].
pub const MAX_WINDOW_ROWS: usize = 50;

// ── Statistics ────────────────────────────────────────────────────────

/// One row of the describe table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Statistic {
    Count,
    Mean,
    Std,
    Min,
    Q25,
    Median,
    Q75,
    Max,
}

impl Statistic {
    /// All statistics in table order.
    pub const ALL: [Statistic; 8] = [
        Self::Count,
        Self::Mean,
        Self::Std,
        Self::Min,
        Self::Q25,
        Self::Median,
        Self::Q75,
        Self::Max,
    ];

    /// Row label as shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Min => "min",
            Self::Q25 => "25%",
            Self::Median => "50%",
            Self::Q75 => "75%",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary of one numeric column (computed over observed values only).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Column name.
    pub column: String,
    /// Number of observed values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: Option<f64>,
    /// Sample standard deviation (n − 1). Needs at least two values.
    pub std: Option<f64>,
    /// Minimum value.
    pub min: Option<f64>,
    /// 25th percentile.
    pub q25: Option<f64>,
    /// 50th percentile.
    pub median: Option<f64>,
    /// 75th percentile.
    pub q75: Option<f64>,
    /// Maximum value.
    pub max: Option<f64>,
}

impl NumericSummary {
    /// Returns one statistic; the count is always defined.
    pub fn get(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Count => Some(self.count as f64),
            Statistic::Mean => self.mean,
            Statistic::Std => self.std,
            Statistic::Min => self.min,
            Statistic::Q25 => self.q25,
            Statistic::Median => self.median,
            Statistic::Q75 => self.q75,
            Statistic::Max => self.max,
        }
    }
}

/// Result of [`describe`]: one summary per numeric column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeTable {
    pub columns: Vec<NumericSummary>,
}

impl DescribeTable {
    /// Returns `true` if the DataFrame had no numeric columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of the summarized columns.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.column.as_str()).collect()
    }

    /// Summary for the named column.
    pub fn summary(&self, column: &str) -> Option<&NumericSummary> {
        self.columns.iter().find(|s| s.column == column)
    }

    /// Row-major view: one row per statistic, one cell per column.
    pub fn rows(&self) -> Vec<(Statistic, Vec<Option<f64>>)> {
        Statistic::ALL
            .iter()
            .map(|&stat| (stat, self.columns.iter().map(|s| s.get(stat)).collect()))
            .collect()
    }
}

/// Summarizes every numeric column; other columns are left out.
pub fn describe(df: &DataFrame) -> DescribeTable {
    let columns: Vec<NumericSummary> = df
        .numeric_columns()
        .map(|(name, col)| summarize(name, col))
        .collect();
    log::debug!(
        "described {} numeric of {} columns",
        columns.len(),
        df.column_count()
    );
    DescribeTable { columns }
}

fn summarize(name: &str, col: &Column) -> NumericSummary {
    let policy = missing_policy(Engine::Describe);
    let observed: Vec<f64> = (0..col.len())
        .filter(|&i| policy.admits(col.is_missing(i)))
        .filter_map(|i| col.number_at(i))
        .collect();

    let count = observed.len();
    if count == 0 {
        return NumericSummary {
            column: name.to_string(),
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        };
    }

    NumericSummary {
        column: name.to_string(),
        count,
        mean: u_numflow::stats::mean(&observed),
        std: if count > 1 {
            u_numflow::stats::std_dev(&observed)
        } else {
            None
        },
        min: u_numflow::stats::min(&observed),
        q25: u_numflow::stats::quantile(&observed, 0.25),
        median: u_numflow::stats::median(&observed),
        q75: u_numflow::stats::quantile(&observed, 0.75),
        max: u_numflow::stats::max(&observed),
    }
}

// ── Row windows ───────────────────────────────────────────────────────

/// Clamps a requested row count to `[1, min(50, row_count)]`, or 0 for an
/// empty DataFrame.
pub fn clamp_window(n: usize, row_count: usize) -> usize {
    if row_count == 0 {
        0
    } else {
        n.clamp(1, row_count.min(MAX_WINDOW_ROWS))
    }
}

/// Returns the first `n` rows in original order.
pub fn head_rows(df: &DataFrame, n: usize) -> DataFrame {
    let take = clamp_window(n, df.row_count());
    let indices: Vec<usize> = (0..take).collect();
    df.take_rows(&indices)
}

/// Returns the last `n` rows in original order.
pub fn tail_rows(df: &DataFrame, n: usize) -> DataFrame {
    let take = clamp_window(n, df.row_count());
    let indices: Vec<usize> = (df.row_count() - take..df.row_count()).collect();
    df.take_rows(&indices)
}

/// Row-window request, as sent by a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowWindow {
    /// Requested row count. Default: 5.
    pub n: usize,
}

impl Default for RowWindow {
    fn default() -> Self {
        Self { n: 5 }
    }
}

impl RowWindow {
    /// First rows of `df`.
    pub fn head(&self, df: &DataFrame) -> DataFrame {
        head_rows(df, self.n)
    }

    /// Last rows of `df`.
    pub fn tail(&self, df: &DataFrame) -> DataFrame {
        tail_rows(df, self.n)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::Value;

    fn numbers(cells: &[Option<f64>]) -> DataFrame {
        DataFrame::from_columns([("x", Column::from_numbers(cells.iter().copied()))]).unwrap()
    }

    #[test]
    fn describe_with_missing() {
        let df = numbers(&[Some(1.0), Some(2.0), None, Some(4.0)]);
        let table = describe(&df);
        let x = table.summary("x").unwrap();
        assert_eq!(x.count, 3);
        assert!((x.mean.unwrap() - 7.0 / 3.0).abs() < 1e-12);
        assert_eq!(x.min, Some(1.0));
        assert_eq!(x.max, Some(4.0));
        assert_eq!(x.median, Some(2.0));
        // sqrt(((1 - 7/3)^2 + (2 - 7/3)^2 + (4 - 7/3)^2) / 2) = sqrt(7/3)
        assert!((x.std.unwrap() - (7.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn quartiles_are_ordered() {
        let df = numbers(&[Some(9.0), Some(1.0), Some(5.0), Some(3.0), Some(7.0)]);
        let x = describe(&df).columns.remove(0);
        let (min, q25, med, q75, max) = (
            x.min.unwrap(),
            x.q25.unwrap(),
            x.median.unwrap(),
            x.q75.unwrap(),
            x.max.unwrap(),
        );
        assert!(min <= q25 && q25 <= med && med <= q75 && q75 <= max);
        assert_eq!(med, 5.0);
    }

    #[test]
    fn all_missing_column_is_undefined() {
        let df = numbers(&[None, None]);
        let x = describe(&df).columns.remove(0);
        assert_eq!(x.count, 0);
        assert_eq!(x.get(Statistic::Count), Some(0.0));
        for stat in &Statistic::ALL[1..] {
            assert_eq!(x.get(*stat), None, "{stat} should be undefined");
        }
    }

    #[test]
    fn single_value_has_no_std() {
        let x = describe(&numbers(&[Some(3.0)])).columns.remove(0);
        assert_eq!(x.mean, Some(3.0));
        assert_eq!(x.std, None);
    }

    #[test]
    fn non_numeric_columns_excluded() {
        let df = DataFrame::from_columns([
            ("flag", Column::from_bools([Some(true)])),
            ("name", Column::from_texts([Some("a")])),
        ])
        .unwrap();
        let table = describe(&df);
        assert!(table.is_empty());
        assert!(table.rows().iter().all(|(_, cells)| cells.is_empty()));
    }

    #[test]
    fn rows_are_in_table_order() {
        let table = describe(&numbers(&[Some(1.0), Some(3.0)]));
        let labels: Vec<&str> = table.rows().iter().map(|(s, _)| s.label()).collect();
        assert_eq!(
            labels,
            vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(table.rows()[0].1, vec![Some(2.0)]);
    }

    // ── Row windows ──────────────────────────────────────────────

    fn sequence(n: usize) -> DataFrame {
        numbers(&(0..n).map(|i| Some(i as f64)).collect::<Vec<_>>())
    }

    #[test]
    fn head_and_tail_keep_order() {
        let df = sequence(10);
        let head = head_rows(&df, 3);
        let tail = tail_rows(&df, 3);
        assert_eq!(head.row_count(), 3);
        assert_eq!(head.row(0), Some(vec![Value::number(0.0)]));
        assert_eq!(head.row(2), Some(vec![Value::number(2.0)]));
        assert_eq!(tail.row(0), Some(vec![Value::number(7.0)]));
        assert_eq!(tail.row(2), Some(vec![Value::number(9.0)]));
    }

    #[test]
    fn window_is_clamped() {
        assert_eq!(clamp_window(0, 10), 1);
        assert_eq!(clamp_window(20, 10), 10);
        assert_eq!(clamp_window(80, 200), MAX_WINDOW_ROWS);
        assert_eq!(head_rows(&sequence(200), 80).row_count(), 50);
        assert_eq!(tail_rows(&sequence(4), 0).row_count(), 1);
    }

    #[test]
    fn empty_frame_yields_empty_window() {
        let df = DataFrame::from_columns([("x", Column::from_numbers([]))]).unwrap();
        let head = head_rows(&df, 5);
        assert_eq!(head.row_count(), 0);
        assert_eq!(head.column_names(), &["x"]);
        assert_eq!(tail_rows(&DataFrame::new(), 5).row_count(), 0);
    }

    #[test]
    fn row_window_defaults_to_five() {
        let window: RowWindow = serde_json::from_str("{}").unwrap();
        assert_eq!(window, RowWindow { n: 5 });
        assert_eq!(window.head(&sequence(8)).row_count(), 5);
        assert_eq!(window.tail(&sequence(3)).row_count(), 3);
    }
}
