//! Missing-value predicate and per-engine handling policy.
//!
//! Every engine asks the same two questions: is this cell missing, and
//! what do I do with it? Both answers live here so that behavior stays
//! consistent across engines.
//!
//! | Engine | Policy |
//! |--------|--------|
//! | [`Describe`](Engine::Describe) | skip |
//! | [`ValueCounts`](Engine::ValueCounts) | own category |
//! | [`GroupKey`](Engine::GroupKey) | own category |
//! | [`GroupTarget`](Engine::GroupTarget) | skip |
//! | [`Correlation`](Engine::Correlation) | skip, pairwise |
//!
//! A skipped cell never turns a result into "undefined" on its own; a
//! statistic is undefined only when nothing is left to compute it from.

use serde::Serialize;

use crate::dataframe::Column;

/// Engines that consult the missing-value policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Engine {
    /// Descriptive statistics over numeric columns.
    Describe,
    /// Frequency counts of a single column.
    ValueCounts,
    /// Group-key columns of a group-by aggregation.
    GroupKey,
    /// The reduced column of a group-by aggregation.
    GroupTarget,
    /// Pairwise Pearson correlation.
    Correlation,
}

/// What an engine does with a missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MissingPolicy {
    /// Leave the cell out of the computation.
    Skip,
    /// Treat "missing" as one more distinct value.
    OwnCategory,
}

impl MissingPolicy {
    /// Returns `true` if a cell with the given missing flag takes part in
    /// the computation.
    #[inline]
    pub fn admits(self, missing: bool) -> bool {
        !missing || self == Self::OwnCategory
    }
}

/// The policy table.
pub const fn missing_policy(engine: Engine) -> MissingPolicy {
    match engine {
        Engine::ValueCounts | Engine::GroupKey => MissingPolicy::OwnCategory,
        Engine::Describe | Engine::GroupTarget | Engine::Correlation => MissingPolicy::Skip,
    }
}

/// Returns `true` if the cell at `row` holds no observed data.
///
/// A cell is missing when its validity bit is clear. Numeric `NaN` is
/// missing as well, whatever its bit says.
#[inline]
pub fn is_missing(column: &Column, row: usize) -> bool {
    match column {
        Column::Numeric { values, validity } => !validity.is_valid(row) || values[row].is_nan(),
        Column::Boolean { validity, .. }
        | Column::Text { validity, .. }
        | Column::Datetime { validity, .. } => !validity.is_valid(row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::ValidityBitmap;

    #[test]
    fn policy_table() {
        assert_eq!(missing_policy(Engine::Describe), MissingPolicy::Skip);
        assert_eq!(missing_policy(Engine::ValueCounts), MissingPolicy::OwnCategory);
        assert_eq!(missing_policy(Engine::GroupKey), MissingPolicy::OwnCategory);
        assert_eq!(missing_policy(Engine::GroupTarget), MissingPolicy::Skip);
        assert_eq!(missing_policy(Engine::Correlation), MissingPolicy::Skip);
    }

    #[test]
    fn admits() {
        assert!(MissingPolicy::Skip.admits(false));
        assert!(!MissingPolicy::Skip.admits(true));
        assert!(MissingPolicy::OwnCategory.admits(true));
    }

    #[test]
    fn nan_is_missing() {
        let col = Column::numeric(vec![1.0, f64::NAN, 0.0], ValidityBitmap::all_valid(3));
        assert!(!is_missing(&col, 0));
        assert!(is_missing(&col, 1));
        assert!(!is_missing(&col, 2));
    }

    #[test]
    fn empty_string_is_not_missing() {
        let col = Column::from_texts([Some(""), None]);
        assert!(!is_missing(&col, 0));
        assert!(is_missing(&col, 1));
    }
}
