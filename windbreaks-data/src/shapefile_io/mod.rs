//! Shapefile layers: `.shp`, `.shx` and `.dbf` through the `shapefile` and
//! `dbase` crates, plus a `.prj` sidecar rendered from the collection CRS.

use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use thiserror::Error;
use windbreaks_core::CrsError;

mod read;
mod write;

pub use read::read_shapefile;
pub use write::write_shapefile;

/// Longest dBase field name.
pub const MAX_FIELD_NAME_LEN: usize = 10;

/// The `.shp` path for a layer path given with or without an extension.
pub(crate) fn shp_path(path: &Utf8Path) -> Utf8PathBuf {
    windbreaks_fs::sidecar_path(path, "shp")
}

/// Shape families a single layer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Point,
    Polyline,
    Polygon,
    Multipoint,
}

/// Errors raised while writing a layer.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to prepare output directory for {path}")]
    CreateDir {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    #[error("feature {index} is a {found:?} but the layer holds {expected:?} shapes")]
    MixedGeometry {
        index: usize,
        expected: ShapeFamily,
        found: ShapeFamily,
    },
    #[error("feature {index} holds a geometry collection, which shapefiles cannot store")]
    UnsupportedGeometry { index: usize },
    #[error("feature {index} has an empty or degenerate geometry")]
    DegenerateGeometry { index: usize },
    #[error("column {column:?} is not a valid dBase field name")]
    FieldName { column: String },
    #[error("columns {first:?} and {second:?} both truncate to the dBase field {field:?}")]
    DuplicateField {
        first: String,
        second: String,
        field: String,
    },
    #[error("failed to write shapefile {path}")]
    Shapefile {
        #[source]
        source: shapefile::Error,
        path: Utf8PathBuf,
    },
    #[error("failed to write projection file {path}")]
    Projection {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
}

/// Errors raised while reading a layer.
#[derive(Debug, Error)]
pub enum ReadLayerError {
    #[error("failed to read shapefile {path}")]
    Shapefile {
        #[source]
        source: shapefile::Error,
        path: Utf8PathBuf,
    },
    #[error("failed to read attribute table {path}")]
    Table {
        #[source]
        source: dbase::Error,
        path: Utf8PathBuf,
    },
    #[error("shape {index} has unsupported type {shape_type}")]
    UnsupportedShape { index: usize, shape_type: String },
    #[error("failed to read projection file {path}")]
    ReadProjection {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    #[error("projection file {path} is not recognised")]
    Crs {
        #[source]
        source: CrsError,
        path: Utf8PathBuf,
    },
}
