//! Interquartile-range outlier removal for numeric table columns.

use thiserror::Error;

use crate::Table;

/// Multiple of the interquartile range tolerated beyond each quartile.
const IQR_FENCE: f64 = 1.5;

/// Errors raised by [`remove_outliers`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    /// The table has no such column.
    #[error("column '{column}' does not exist")]
    MissingColumn {
        /// Requested column.
        column: String,
    },
    /// The column holds no finite numbers to take quantiles of.
    #[error("column '{column}' has no numeric values")]
    NoNumericValues {
        /// Requested column.
        column: String,
    },
}

/// Quantile `q` of `values` by linear interpolation between closest ranks.
///
/// Returns `None` for an empty slice or `q` outside `0.0..=1.0`. The input
/// need not be sorted.
///
/// # Examples
/// ```
/// use windbreaks_core::quantile;
///
/// assert_eq!(quantile(&[4.0, 1.0, 3.0, 2.0], 0.5), Some(2.5));
/// assert_eq!(quantile(&[], 0.5), None);
/// ```
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = rank - rank.floor();
    let low = *sorted.get(lower)?;
    let high = *sorted.get(upper)?;
    Some(low + (high - low) * fraction)
}

/// Drop the rows whose `column` value lies outside
/// `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`.
///
/// Rows whose value is missing or not numeric are kept. Returns a new table;
/// the input is untouched.
pub fn remove_outliers(table: &Table, column: &str) -> Result<Table, StatsError> {
    if !table.has_column(column) {
        return Err(StatsError::MissingColumn {
            column: column.to_owned(),
        });
    }
    let values: Vec<f64> = table
        .records()
        .iter()
        .filter_map(|record| record.number(column))
        .collect();
    let no_values = || StatsError::NoNumericValues {
        column: column.to_owned(),
    };
    let q1 = quantile(&values, 0.25).ok_or_else(no_values)?;
    let q3 = quantile(&values, 0.75).ok_or_else(no_values)?;
    let iqr = q3 - q1;
    let fence = (q1 - IQR_FENCE * iqr)..=(q3 + IQR_FENCE * iqr);
    Ok(table
        .clone()
        .filter(|record| record.number(column).is_none_or(|value| fence.contains(&value))))
}
