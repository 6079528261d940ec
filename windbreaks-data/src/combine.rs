//! Multi-file table assembly for the crop-loss and prefixed CSV exports.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Datelike, Local};
use log::{debug, warn};
use thiserror::Error;
use windbreaks_core::{AttributeValue, Table};
use windbreaks_fs::{file_is_file, list_file_names};

use crate::{CsvError, DelimitedOptions, Encoding, read_delimited, read_table};

/// Header list, relative to the source directory.
pub const COLSOM_HEADERS: &str = "crop_loss_COL/colsom_headers.csv";
/// First year loaded when no years are requested.
pub const FIRST_DEFAULT_YEAR: i32 = 2000;
/// Column holding the loss year.
pub const YEAR_COLUMN: &str = "Year of Loss";
/// Column holding the two-letter state code.
pub const STATE_COLUMN: &str = "State Abbreviation";

/// Cause-of-loss year file for `year`, relative to the source directory.
pub fn colsom_year_file(year: i32) -> String {
    format!("crop_loss_COL/colsom_{year}.txt")
}

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("failed to read header list")]
    Headers(#[source] CsvError),
    #[error("failed to read {path}")]
    Read {
        #[source]
        source: CsvError,
        path: Utf8PathBuf,
    },
    #[error("failed to inspect {path}")]
    Inspect {
        #[source]
        source: std::io::Error,
        path: Utf8PathBuf,
    },
    #[error("failed to list {dir}")]
    List {
        #[source]
        source: std::io::Error,
        dir: Utf8PathBuf,
    },
    #[error("none of the requested year files exist under {dir}")]
    NoYearFiles { dir: Utf8PathBuf },
    #[error("no CSV files starting with {prefix:?} in {dir}")]
    NoMatchingFiles { dir: Utf8PathBuf, prefix: String },
}

/// Filters for [`combine_years`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombineOptions {
    /// Years to load; `None` loads 2000 through the current year.
    pub years: Option<Vec<i32>>,
    /// State abbreviations to keep; `None` keeps every state.
    pub states: Option<Vec<String>>,
}

/// Every year from 2000 through `through`, inclusive.
pub fn default_years(through: i32) -> Vec<i32> {
    (FIRST_DEFAULT_YEAR..=through).collect()
}

fn read_headers(src_dir: &Utf8Path) -> Result<Vec<String>, CombineError> {
    let options = DelimitedOptions {
        has_headers: false,
        encoding: Encoding::Latin1,
        ..DelimitedOptions::default()
    };
    let listing = read_delimited(&src_dir.join(COLSOM_HEADERS), &options)
        .map_err(CombineError::Headers)?;
    Ok(listing
        .records()
        .iter()
        .filter_map(|record| record.get("1"))
        .filter(|name| !name.is_missing())
        .map(ToString::to_string)
        .collect())
}

/// Normalise a loss year to its integer form, as `"2011"` for `2011.0`.
fn year_of(value: &AttributeValue) -> Option<i64> {
    let number = match value {
        AttributeValue::Number(number) => *number,
        AttributeValue::Text(text) => text.trim().parse::<f64>().ok()?,
        AttributeValue::Missing => return None,
    };
    number.is_finite().then(|| number.trunc() as i64)
}

/// Concatenate the yearly cause-of-loss files under `src_dir`.
///
/// Rows without a loss year are dropped; the year is stored as its integer
/// text. Missing year files are skipped with a warning.
pub fn combine_years(src_dir: &Utf8Path, options: &CombineOptions) -> Result<Table, CombineError> {
    let headers = read_headers(src_dir)?;
    let years = options
        .years
        .clone()
        .unwrap_or_else(|| default_years(Local::now().year()));
    let wanted: BTreeSet<i64> = years.iter().map(|year| i64::from(*year)).collect();
    let states: Option<BTreeSet<&str>> = options
        .states
        .as_ref()
        .map(|states| states.iter().map(String::as_str).collect());

    let mut tables = Vec::new();
    for year in &years {
        let path = src_dir.join(colsom_year_file(*year));
        let exists = file_is_file(&path).map_err(|source| CombineError::Inspect {
            source,
            path: path.clone(),
        })?;
        if !exists {
            warn!("File {path} not found.");
            continue;
        }
        let table = read_delimited(&path, &DelimitedOptions::headerless_pipe(headers.clone()))
            .map_err(|source| CombineError::Read {
                source,
                path: path.clone(),
            })?;
        let before = table.len();
        let mut kept = table.filter(|record| {
            let in_years = record
                .get(YEAR_COLUMN)
                .and_then(year_of)
                .is_some_and(|loss_year| wanted.contains(&loss_year));
            let in_states = states.as_ref().is_none_or(|states| {
                record
                    .get(STATE_COLUMN)
                    .map(ToString::to_string)
                    .is_some_and(|state| states.contains(state.as_str()))
            });
            in_years && in_states
        });
        for record in kept.records_mut() {
            if let Some(loss_year) = record.get(YEAR_COLUMN).and_then(year_of) {
                record.insert(YEAR_COLUMN, AttributeValue::Text(loss_year.to_string()));
            }
        }
        debug!("Kept {} of {before} rows from {path}", kept.len());
        tables.push(kept);
    }

    if tables.is_empty() {
        return Err(CombineError::NoYearFiles {
            dir: src_dir.to_path_buf(),
        });
    }
    Ok(Table::concat(std::iter::once(Table::new(headers)).chain(tables)))
}

/// Concatenate every `*.csv` file in `src_dir` whose name starts with
/// `prefix`, in file-name order, taking the union of their columns.
pub fn combine_prefixed_csv(src_dir: &Utf8Path, prefix: &str) -> Result<Table, CombineError> {
    let names = list_file_names(src_dir).map_err(|source| CombineError::List {
        source,
        dir: src_dir.to_path_buf(),
    })?;
    let tables = names
        .iter()
        .filter(|name| name.starts_with(prefix) && name.ends_with(".csv"))
        .map(|name| {
            let path = src_dir.join(name);
            read_table(&path).map_err(|source| CombineError::Read { source, path })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if tables.is_empty() {
        return Err(CombineError::NoMatchingFiles {
            dir: src_dir.to_path_buf(),
            prefix: prefix.to_owned(),
        });
    }
    Ok(Table::concat(tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_years_start_in_2000() {
        let years = default_years(2003);
        assert_eq!(years, vec![2000, 2001, 2002, 2003]);
    }

    #[rstest]
    #[case(AttributeValue::Number(2011.0), Some(2011))]
    #[case(AttributeValue::Text("2012.0".into()), Some(2012))]
    #[case(AttributeValue::Text("unknown".into()), None)]
    #[case(AttributeValue::Missing, None)]
    fn normalises_loss_years(#[case] value: AttributeValue, #[case] expected: Option<i64>) {
        assert_eq!(year_of(&value), expected);
    }

    #[rstest]
    fn year_files_follow_naming_scheme() {
        assert_eq!(colsom_year_file(2019), "crop_loss_COL/colsom_2019.txt");
    }
}
