//! File adapters for the WindBreaks toolkit.
//!
//! Responsibilities:
//! - Read delimited text into [`Table`]s.
//! - Resolve geometries and run the ingestion pipeline.
//! - Persist and reload shapefile layers.
//! - Assemble multi-year crop-loss tables.
//!
//! Boundaries:
//! - Domain rules (extents, distances, projections) live in
//!   `windbreaks-core`.
//! - All I/O is blocking and single-threaded.

use windbreaks_core::{Capability, Registry};

pub use windbreaks_core::Table;

mod buffer;
mod combine;
mod csv_source;
mod describe;
mod ingest;
mod shapefile_io;

pub use buffer::{BufferLayerError, buffer};
pub use combine::{
    COLSOM_HEADERS, CombineError, CombineOptions, FIRST_DEFAULT_YEAR, STATE_COLUMN, YEAR_COLUMN,
    colsom_year_file, combine_prefixed_csv, combine_years, default_years,
};
pub use csv_source::{CsvError, DelimitedOptions, Encoding, read_delimited, read_table};
pub use describe::{
    DescribeError, LayerDescription, SourceKind, collection_table, describe_path, describe_table,
};
pub use ingest::{
    GEOMETRY_COLUMN, GeometryMode, IngestError, IngestOptions, IngestReport, IngestSource, ingest,
    ingest_report,
};
pub use shapefile_io::{
    MAX_FIELD_NAME_LEN, PersistError, ReadLayerError, ShapeFamily, read_shapefile,
    write_shapefile,
};

/// Register the file-backed operations.
pub fn register(registry: &mut Registry) {
    registry.register(Capability::new(
        "ingest",
        "read storm events, resolve geometries, filter by extent and write a shapefile",
    ));
    registry.register(Capability::new(
        "buffer",
        "buffer a layer in its CRS linear unit and write the result",
    ));
    registry.register(Capability::new(
        "read_shapefile",
        "load a shapefile layer with its CRS",
    ));
    registry.register(Capability::new(
        "combine_years",
        "concatenate yearly cause-of-loss files filtered by year and state",
    ));
    registry.register(Capability::new(
        "combine_prefixed_csv",
        "concatenate CSV files sharing a name prefix",
    ));
    registry.register(Capability::new(
        "describe",
        "list columns with inferred types and the layer CRS",
    ));
}
