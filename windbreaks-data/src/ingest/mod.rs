//! Storm-event ingestion: resolve geometries, drop what cannot be placed,
//! keep what touches the extent, optionally persist.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use thiserror::Error;
use windbreaks_core::{CoordinateFields, Crs, Extent, Feature, GeometryCollection, Table};

use crate::{CsvError, PersistError, read_table, write_shapefile};

mod resolve;

pub use resolve::GeometryMode;
use resolve::{Unresolved, resolve_geometry};

/// Name of the optional WKT column.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Where ingested records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestSource {
    /// A comma-separated file with a header row.
    Path(Utf8PathBuf),
    /// Records already in memory, possibly carrying a CRS.
    Records(Table),
}

impl From<Table> for IngestSource {
    fn from(table: Table) -> Self {
        Self::Records(table)
    }
}

impl From<&Utf8Path> for IngestSource {
    fn from(path: &Utf8Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Optional ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestOptions {
    /// Shapefile to write the result to, replacing any existing layer.
    pub output: Option<Utf8PathBuf>,
    /// Geometry synthesis for records without a `geometry` column.
    pub mode: GeometryMode,
}

/// Collection plus the counts behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Records kept, in input order.
    pub collection: GeometryCollection,
    /// Records read from the source.
    pub read: usize,
    /// Records without a resolvable geometry.
    pub dropped: usize,
    /// Records whose begin and end points both lie outside the extent.
    pub outside_extent: usize,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read source {path}")]
    ReadSource {
        #[source]
        source: CsvError,
        path: Utf8PathBuf,
    },
    #[error("failed to parse source {path}")]
    ParseCsv {
        #[source]
        source: CsvError,
        path: Utf8PathBuf,
    },
    #[error("failed to persist ingested layer to {path}")]
    Persist {
        #[source]
        source: PersistError,
        path: Utf8PathBuf,
    },
}

/// Ingest `source` into a geometry collection filtered by `extent`.
///
/// # Examples
/// ```
/// use windbreaks_core::{AttributeValue, Extent, Record, Table};
/// use windbreaks_data::{IngestOptions, IngestSource, ingest};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut table = Table::new(["BEGIN_LAT", "BEGIN_LON"]);
/// table.push(Record::from_fields([
///     ("BEGIN_LAT", AttributeValue::Number(42.0)),
///     ("BEGIN_LON", AttributeValue::Number(-97.0)),
/// ]));
/// let extent = Extent::new(40.0, 45.0, -100.0, -95.0)?;
/// let collection = ingest(IngestSource::Records(table), &extent, &IngestOptions::default())?;
/// assert_eq!(collection.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn ingest(
    source: IngestSource,
    extent: &Extent,
    options: &IngestOptions,
) -> Result<GeometryCollection, IngestError> {
    ingest_report(source, extent, options).map(|report| report.collection)
}

/// Ingest `source`, returning the collection with read, dropped and
/// out-of-extent counts.
pub fn ingest_report(
    source: IngestSource,
    extent: &Extent,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError> {
    let table = match source {
        IngestSource::Path(path) => read_table(&path).map_err(|source| match source {
            CsvError::Open { .. } => IngestError::ReadSource {
                source,
                path: path.clone(),
            },
            CsvError::Parse { .. } | CsvError::ColumnCount { .. } | CsvError::Encoding { .. } => {
                IngestError::ParseCsv {
                    source,
                    path: path.clone(),
                }
            }
        })?,
        IngestSource::Records(table) => table,
    };
    let crs = table.crs().cloned().unwrap_or_else(Crs::nad83);
    let has_geometry_column = table.has_column(GEOMETRY_COLUMN);
    let fields = CoordinateFields::STORM_EVENTS;

    let records = table.into_records();
    let read = records.len();
    let mut features = Vec::with_capacity(read);
    for (index, mut record) in records.into_iter().enumerate() {
        let wkt = if has_geometry_column {
            Some(record.remove(GEOMETRY_COLUMN).unwrap_or_default())
        } else {
            None
        };
        match resolve_geometry(&record, wkt.as_ref(), options.mode, &fields) {
            Ok(geometry) => features.push(Feature::new(record, geometry)),
            Err(reason) => log_drop(index, &reason),
        }
    }
    let dropped = read - features.len();

    let resolved = GeometryCollection::from_features(crs, features);
    let resolved_count = resolved.len();
    let collection = resolved.filter_extent(extent, &fields);
    let outside_extent = resolved_count - collection.len();

    if let Some(output) = &options.output {
        write_shapefile(&collection, output).map_err(|source| IngestError::Persist {
            source,
            path: output.clone(),
        })?;
        info!(
            "Wrote {} ingested features to {output} ({} dropped, {} outside extent)",
            collection.len(),
            dropped,
            outside_extent
        );
    }

    Ok(IngestReport {
        collection,
        read,
        dropped,
        outside_extent,
    })
}

fn log_drop(index: usize, reason: &Unresolved) {
    match reason {
        Unresolved::MissingGeometry => debug!("Dropped record {index}: no geometry value"),
        Unresolved::EmptyGeometry => debug!("Dropped record {index}: empty geometry"),
        Unresolved::InvalidWkt(err) => debug!("Dropped record {index}: invalid WKT ({err})"),
        Unresolved::MissingCoordinates => {
            debug!("Dropped record {index}: missing or non-finite coordinates");
        }
    }
}
