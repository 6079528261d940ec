//! Delimited text sources.
//!
//! Cells are typed with [`AttributeValue::parse`]. Rows may be shorter than
//! the header; the missing cells are treated as empty.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ByteRecord, ReaderBuilder};
use thiserror::Error;
use windbreaks_core::{AttributeValue, Record, Table};
use windbreaks_fs::open_utf8_file;

/// Character encoding of a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8; invalid sequences are an error.
    #[default]
    Utf8,
    /// ISO-8859-1, where every byte is one character.
    Latin1,
}

impl Encoding {
    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Latin1 => Some(bytes.iter().copied().map(char::from).collect()),
        }
    }
}

/// How to read a delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedOptions {
    /// Field separator byte.
    pub delimiter: u8,
    /// Whether the first row names the columns.
    pub has_headers: bool,
    /// Column names to use instead of a header row. When set, a row with
    /// more cells than names is an error.
    pub columns: Option<Vec<String>>,
    /// Byte encoding of the file.
    pub encoding: Encoding,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            columns: None,
            encoding: Encoding::Utf8,
        }
    }
}

impl DelimitedOptions {
    /// Pipe-separated rows without a header, named by `columns`.
    pub fn headerless_pipe(columns: Vec<String>) -> Self {
        Self {
            delimiter: b'|',
            has_headers: false,
            columns: Some(columns),
            encoding: Encoding::Utf8,
        }
    }
}

/// Errors raised while reading a delimited file.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}")]
    Open {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    #[error("failed to parse {path}")]
    Parse {
        #[source]
        source: csv::Error,
        path: Utf8PathBuf,
    },
    #[error("{path} line {line}: expected at most {expected} fields, found {found}")]
    ColumnCount {
        path: Utf8PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{path} line {line}: invalid UTF-8")]
    Encoding { path: Utf8PathBuf, line: u64 },
}

/// Read a comma-separated file with a header row.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use windbreaks_data::read_table;
///
/// # fn main() -> Result<(), windbreaks_data::CsvError> {
/// let table = read_table(Utf8Path::new("StormEvents_details_2019.csv"))?;
/// println!("{} events", table.len());
/// # Ok(())
/// # }
/// ```
pub fn read_table(path: &Utf8Path) -> Result<Table, CsvError> {
    read_delimited(path, &DelimitedOptions::default())
}

/// Read a delimited file according to `options`.
///
/// Without a header row or explicit names, columns are numbered from `"0"`.
pub fn read_delimited(path: &Utf8Path, options: &DelimitedOptions) -> Result<Table, CsvError> {
    let file = open_utf8_file(path).map_err(|source| CsvError::Open {
        source,
        path: path.to_path_buf(),
    })?;
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .from_reader(file);
    let parse_error = |source| CsvError::Parse {
        source,
        path: path.to_path_buf(),
    };

    let mut columns = match (&options.columns, options.has_headers) {
        (Some(names), _) => names.clone(),
        (None, true) => {
            let headers = reader.byte_headers().map_err(parse_error)?.clone();
            decode_row(path, options.encoding, &headers, 1)?
                .into_iter()
                .map(|name| name.trim().to_owned())
                .collect()
        }
        (None, false) => Vec::new(),
    };
    let fixed_width = options.columns.is_some();

    let mut rows = Vec::new();
    let mut row = ByteRecord::new();
    while reader.read_byte_record(&mut row).map_err(parse_error)? {
        let line = row.position().map_or(0, csv::Position::line);
        let cells = decode_row(path, options.encoding, &row, line)?;
        if cells.len() > columns.len() {
            if fixed_width || options.has_headers {
                return Err(CsvError::ColumnCount {
                    path: path.to_path_buf(),
                    line,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            columns.extend((columns.len()..cells.len()).map(|index| index.to_string()));
        }
        rows.push(cells);
    }

    let mut table = Table::new(columns.iter().cloned());
    for cells in rows {
        let mut values = cells.iter().map(|cell| AttributeValue::parse(cell));
        let record = Record::from_fields(
            columns
                .iter()
                .map(|name| (name.clone(), values.next().unwrap_or_default())),
        );
        table.push(record);
    }
    Ok(table)
}

fn decode_row(
    path: &Utf8Path,
    encoding: Encoding,
    row: &ByteRecord,
    line: u64,
) -> Result<Vec<String>, CsvError> {
    row.iter()
        .map(|field| {
            encoding.decode(field).ok_or_else(|| CsvError::Encoding {
                path: path.to_path_buf(),
                line,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> Utf8PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        Utf8PathBuf::from_path_buf(path).expect("UTF-8 path")
    }

    #[rstest]
    fn types_cells_and_pads_short_rows(temp_dir: TempDir) {
        let path = write(
            &temp_dir,
            "events.csv",
            b"BEGIN_LAT,BEGIN_LON,EVENT_TYPE\n42.5,-97.25,Hail\n41.0\n",
        );
        let table = read_table(&path).expect("read table");
        assert_eq!(table.columns(), ["BEGIN_LAT", "BEGIN_LON", "EVENT_TYPE"]);
        let first = &table.records()[0];
        assert_eq!(first.number("BEGIN_LAT"), Some(42.5));
        assert_eq!(first.text("EVENT_TYPE"), Some("Hail"));
        let second = &table.records()[1];
        assert_eq!(second.get("BEGIN_LON"), Some(&AttributeValue::Missing));
    }

    #[rstest]
    fn rejects_rows_wider_than_header(temp_dir: TempDir) {
        let path = write(&temp_dir, "wide.csv", b"a,b\n1,2,3\n");
        let err = read_table(&path).expect_err("row too wide");
        assert!(matches!(
            err,
            CsvError::ColumnCount {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[rstest]
    fn names_headerless_pipe_rows(temp_dir: TempDir) {
        let path = write(&temp_dir, "colsom_2001.txt", b"2001|NE|12.5\n2002|KS\n");
        let options = DelimitedOptions::headerless_pipe(vec![
            "Year of Loss".into(),
            "State Abbreviation".into(),
            "Indemnity Amount".into(),
        ]);
        let table = read_delimited(&path, &options).expect("read pipe file");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].text("State Abbreviation"), Some("KS"));
        assert_eq!(
            table.records()[1].get("Indemnity Amount"),
            Some(&AttributeValue::Missing)
        );
    }

    #[rstest]
    fn numbers_columns_without_header(temp_dir: TempDir) {
        let path = write(&temp_dir, "headers.csv", b"1,Year of Loss\n2,State Abbreviation\n");
        let options = DelimitedOptions {
            has_headers: false,
            encoding: Encoding::Latin1,
            ..DelimitedOptions::default()
        };
        let table = read_delimited(&path, &options).expect("read headers");
        assert_eq!(table.columns(), ["0", "1"]);
        assert_eq!(table.records()[0].text("1"), Some("Year of Loss"));
    }

    #[rstest]
    fn decodes_latin1_bytes(temp_dir: TempDir) {
        let path = write(&temp_dir, "latin.csv", b"name\nCa\xf1on\n");
        let options = DelimitedOptions {
            encoding: Encoding::Latin1,
            ..DelimitedOptions::default()
        };
        let table = read_delimited(&path, &options).expect("read latin1");
        assert_eq!(table.records()[0].text("name"), Some("Ca\u{f1}on"));
        let err = read_table(&path).expect_err("invalid UTF-8");
        assert!(matches!(err, CsvError::Encoding { line: 2, .. }));
    }

    #[rstest]
    fn missing_file_reports_path() {
        let path = Utf8PathBuf::from("/nonexistent/storms.csv");
        match read_table(&path).expect_err("missing file") {
            CsvError::Open { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected open error, got {other:?}"),
        }
    }
}
