//! Column and CRS summaries for files on disk.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use windbreaks_core::{ColumnSummary, CrsSummary, GeometryCollection, Table};

use crate::{CsvError, ReadLayerError, read_shapefile, read_table};

/// File formats the toolkit can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.csv` or `.txt` with a header row.
    Delimited,
    /// `.shp` with its sidecars.
    Shapefile,
}

impl SourceKind {
    /// Classify `path` by extension, ignoring case.
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Some(Self::Delimited),
            "shp" => Some(Self::Shapefile),
            _ => None,
        }
    }
}

/// What `describe` reports about a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDescription {
    /// Columns with position and inferred type.
    pub columns: Vec<ColumnSummary>,
    /// Number of records.
    pub records: usize,
    /// CRS of a spatial layer.
    pub crs: Option<CrsSummary>,
}

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("{path} is neither a delimited file nor a shapefile")]
    UnsupportedFormat { path: Utf8PathBuf },
    #[error(transparent)]
    Delimited(#[from] CsvError),
    #[error(transparent)]
    Shapefile(#[from] ReadLayerError),
}

/// View a collection's attributes as a table carrying its CRS.
pub fn collection_table(collection: &GeometryCollection) -> Table {
    let mut table = Table::new(collection.columns()).with_crs(collection.crs().clone());
    for feature in collection {
        table.push(feature.record.clone());
    }
    table
}

/// Summarise a table.
pub fn describe_table(table: &Table) -> LayerDescription {
    LayerDescription {
        columns: table.describe(),
        records: table.len(),
        crs: table.crs().map(windbreaks_core::Crs::describe),
    }
}

/// Open `path` and summarise its columns and CRS.
pub fn describe_path(path: &Utf8Path) -> Result<LayerDescription, DescribeError> {
    let table = match SourceKind::from_path(path) {
        Some(SourceKind::Delimited) => read_table(path)?,
        Some(SourceKind::Shapefile) => collection_table(&read_shapefile(path)?),
        None => {
            return Err(DescribeError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    Ok(describe_table(&table))
}
