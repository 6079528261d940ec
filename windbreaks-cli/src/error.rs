//! Error types emitted by the WindBreaks CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use windbreaks_core::{BufferSpecError, Crs, CrsError, ExtentError};
use windbreaks_data::{BufferLayerError, CsvError, DescribeError, IngestError, ReadLayerError};

/// Errors emitted by the WindBreaks CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The input exists but its extension names a format the command
    /// cannot read.
    #[error("{field} path {path:?} is not a supported format for this command")]
    UnsupportedSource {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The extent bounds were rejected.
    #[error("invalid extent: {0}")]
    InvalidExtent(#[from] ExtentError),
    /// The `--crs` code is not a known coordinate reference system.
    #[error("invalid CRS: {0}")]
    UnknownCrs(#[from] CrsError),
    /// A projected `--crs` was given for a source whose geometries are
    /// built from latitude and longitude columns.
    #[error(
        "--crs {crs} is projected but {path:?} has no geometry column; \
         coordinates built from latitude and longitude are in degrees"
    )]
    ProjectedCrsWithoutGeometry { crs: Crs, path: Utf8PathBuf },
    /// The `--distance` value did not parse.
    #[error("invalid buffer distance: {0}")]
    InvalidDistance(#[from] BufferSpecError),
    /// Reading the source table failed before ingestion.
    #[error("failed to read {path:?}: {source}")]
    ReadTable {
        path: Utf8PathBuf,
        #[source]
        source: CsvError,
    },
    /// The ingestion pipeline failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Loading the layer to buffer failed.
    #[error(transparent)]
    ReadLayer(#[from] ReadLayerError),
    /// Buffering or persisting the buffered layer failed.
    #[error(transparent)]
    Buffer(#[from] BufferLayerError),
    /// Describing the input failed.
    #[error(transparent)]
    Describe(#[from] DescribeError),
    /// Writing the command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
