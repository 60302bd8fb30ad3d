//! Pairwise Pearson correlation across numeric columns.
//!
//! Each pair of columns is correlated over the rows where *both* values are
//! observed (pairwise-complete observations), so a missing value in one
//! column never removes rows from unrelated pairs.
//!
//! Fewer than two numeric columns is not an error: [`correlate`] returns
//! [`Correlation::NotApplicable`].
//!
//! ```
//! use data_portal::correlation::{correlate, Correlation};
//! use data_portal::dataframe::{Column, DataFrame};
//!
//! let df = DataFrame::from_columns([
//!     ("x", Column::from_numbers([Some(1.0), Some(2.0), Some(3.0), Some(4.0)])),
//!     ("y", Column::from_numbers([Some(2.0), Some(4.0), Some(6.0), None])),
//! ])
//! .unwrap();
//!
//! match correlate(&df) {
//!     Correlation::Matrix(m) => assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-12),
//!     Correlation::NotApplicable { .. } => unreachable!(),
//! }
//! ```

use serde::Serialize;

use crate::dataframe::{Column, DataFrame};
use crate::missing::{missing_policy, Engine};

/// Outcome of [`correlate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Correlation {
    /// Correlation matrix over all numeric columns.
    Matrix(CorrelationMatrix),
    /// Fewer than two numeric columns; there is nothing to correlate.
    NotApplicable { numeric_columns: usize },
}

impl Correlation {
    /// Returns the matrix, if one was computed.
    pub fn matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            Self::Matrix(m) => Some(m),
            Self::NotApplicable { .. } => None,
        }
    }
}

/// A pair of columns with a strong correlation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub col_a: String,
    pub col_b: String,
    pub r: f64,
}

/// Symmetric n×n correlation matrix indexed by numeric column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Column names, in DataFrame order.
    pub names: Vec<String>,
    /// Row-major cells; `None` where the coefficient is undefined.
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Cell `(i, j)`; `None` if undefined or out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let n = self.size();
        if i >= n || j >= n {
            return None;
        }
        self.values[i * n + j]
    }

    /// Cell for the named pair.
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.get(i, j)
    }

    /// Row `i` of the matrix, or `None` if out of range.
    pub fn row(&self, i: usize) -> Option<&[Option<f64>]> {
        let n = self.size();
        if i >= n {
            return None;
        }
        self.values.get(i * n..(i + 1) * n)
    }

    /// Off-diagonal pairs with `|r| > threshold`, strongest first.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<CorrelationPair> {
        let n = self.size();
        let mut pairs: Vec<CorrelationPair> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter_map(|(i, j)| {
                let r = self.get(i, j)?;
                (r.abs() > threshold).then(|| CorrelationPair {
                    col_a: self.names[i].clone(),
                    col_b: self.names[j].clone(),
                    r,
                })
            })
            .collect();
        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs
    }
}

/// Correlates every pair of numeric columns.
pub fn correlate(df: &DataFrame) -> Correlation {
    let numeric: Vec<(&str, &Column)> = df.numeric_columns().collect();
    if numeric.len() < 2 {
        log::debug!(
            "correlation not applicable: {} numeric column(s)",
            numeric.len()
        );
        return Correlation::NotApplicable {
            numeric_columns: numeric.len(),
        };
    }

    let n = numeric.len();
    let mut values = vec![None; n * n];
    for i in 0..n {
        let (_, col) = numeric[i];
        values[i * n + i] = (col.valid_count() > 0).then_some(1.0);
        for j in (i + 1)..n {
            let r = pairwise_pearson(col, numeric[j].1);
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    log::debug!("correlated {n} numeric columns");
    Correlation::Matrix(CorrelationMatrix {
        names: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}

/// Pearson r over rows where both columns are observed.
///
/// `None` with fewer than two complete pairs or when either side is
/// constant over those pairs. Each side is divided by its largest
/// magnitude first; r is scale-invariant and the sums of squares stay
/// finite for values near `f64::MAX`.
pub fn pairwise_pearson(a: &Column, b: &Column) -> Option<f64> {
    let policy = missing_policy(Engine::Correlation);
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..a.len().min(b.len()))
        .filter(|&row| policy.admits(a.is_missing(row)) && policy.admits(b.is_missing(row)))
        .filter_map(|row| Some((a.number_at(row)?, b.number_at(row)?)))
        .unzip();

    if xs.len() < 2 || is_constant(&xs) || is_constant(&ys) {
        return None;
    }
    let (xs, ys) = (rescale(&xs), rescale(&ys));
    if xs.len() == 2 {
        // Two distinct points always lie on a line
        return Some(((xs[1] - xs[0]) * (ys[1] - ys[0])).signum());
    }
    u_analytics::correlation::pearson(&xs, &ys).map(|p| p.r.clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn rescale(values: &[f64]) -> Vec<f64> {
    let peak = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if peak.is_finite() && peak > 0.0 {
        values.iter().map(|v| v / peak).collect()
    } else {
        values.to_vec()
    }
}
