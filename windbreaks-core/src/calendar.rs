//! Month-name helpers for crop-loss tables keyed by month.

use chrono::Month;
use thiserror::Error;

/// Returned when a string is not a full English month name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown month name '{name}'")]
pub struct MonthNameError {
    /// The rejected input.
    pub name: String,
}

/// Convert a full English month name to its number, `1..=12`.
///
/// Matching ignores case and surrounding whitespace. Abbreviations such as
/// `"Jan"` are rejected.
///
/// # Examples
/// ```
/// use windbreaks_core::month_name_to_number;
///
/// assert_eq!(month_name_to_number("March"), Ok(3));
/// assert_eq!(month_name_to_number("december"), Ok(12));
/// assert!(month_name_to_number("Mar").is_err());
/// ```
pub fn month_name_to_number(name: &str) -> Result<u32, MonthNameError> {
    let trimmed = name.trim();
    let rejected = || MonthNameError {
        name: name.to_owned(),
    };
    let month = trimmed.parse::<Month>().map_err(|_| rejected())?;
    if month.name().eq_ignore_ascii_case(trimmed) {
        Ok(month.number_from_month())
    } else {
        Err(rejected())
    }
}
