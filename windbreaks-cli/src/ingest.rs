//! `ingest` command: storm-event CSV to an extent-filtered shapefile.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use windbreaks_core::{Crs, Extent};
use windbreaks_data::{
    GEOMETRY_COLUMN, GeometryMode, IngestOptions, IngestReport, IngestSource, SourceKind,
    ingest_report, read_table,
};

use crate::{CliError, require_source};

pub(crate) const ARG_SOURCE: &str = "source";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_MIN_LAT: &str = "min-lat";
pub(crate) const ARG_MAX_LAT: &str = "max-lat";
pub(crate) const ARG_MIN_LON: &str = "min-lon";
pub(crate) const ARG_MAX_LON: &str = "max-lon";
pub(crate) const ARG_CRS: &str = "crs";
pub(crate) const ENV_SOURCE: &str = "WINDBREAKS_CMDS_INGEST_SOURCE";
pub(crate) const ENV_OUTPUT: &str = "WINDBREAKS_CMDS_INGEST_OUTPUT";
pub(crate) const ENV_MIN_LAT: &str = "WINDBREAKS_CMDS_INGEST_MIN_LAT";
pub(crate) const ENV_MAX_LAT: &str = "WINDBREAKS_CMDS_INGEST_MAX_LAT";
pub(crate) const ENV_MIN_LON: &str = "WINDBREAKS_CMDS_INGEST_MIN_LON";
pub(crate) const ENV_MAX_LON: &str = "WINDBREAKS_CMDS_INGEST_MAX_LON";

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve a geometry for every storm event, drop the ones \
                 that cannot be placed, keep those whose begin or end point \
                 lies in the extent and write them as a shapefile. Values \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Filter storm events to an extent and write a shapefile"
)]
#[ortho_config(prefix = "WINDBREAKS")]
pub(crate) struct IngestArgs {
    /// Storm-event CSV with `BEGIN_LAT`/`BEGIN_LON`/`END_LAT`/`END_LON`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) source: Option<Utf8PathBuf>,
    /// Shapefile to write; existing files are replaced.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Southern bound in degrees.
    #[arg(long = ARG_MIN_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) min_lat: Option<f64>,
    /// Northern bound in degrees.
    #[arg(long = ARG_MAX_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) max_lat: Option<f64>,
    /// Western bound in degrees.
    #[arg(long = ARG_MIN_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) min_lon: Option<f64>,
    /// Eastern bound in degrees.
    #[arg(long = ARG_MAX_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) max_lon: Option<f64>,
    /// Build begin-to-end segments instead of begin points.
    #[arg(long)]
    #[serde(default)]
    pub(crate) segments: bool,
    /// EPSG code of the source coordinates; defaults to NAD83 (4269).
    #[arg(long = ARG_CRS, value_name = "epsg")]
    #[serde(default)]
    pub(crate) crs: Option<u32>,
}

impl IngestArgs {
    fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IngestConfig {
    pub(crate) source: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) extent: Extent,
    pub(crate) mode: GeometryMode,
    pub(crate) crs: Option<Crs>,
}

impl IngestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_source(&self.source, ARG_SOURCE, SourceKind::Delimited)
    }
}

fn required<T>(value: Option<T>, field: &'static str, env: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let source = required(args.source, ARG_SOURCE, ENV_SOURCE)?;
        let output = required(args.output, ARG_OUTPUT, ENV_OUTPUT)?;
        let extent = Extent::new(
            required(args.min_lat, ARG_MIN_LAT, ENV_MIN_LAT)?,
            required(args.max_lat, ARG_MAX_LAT, ENV_MAX_LAT)?,
            required(args.min_lon, ARG_MIN_LON, ENV_MIN_LON)?,
            required(args.max_lon, ARG_MAX_LON, ENV_MAX_LON)?,
        )?;
        let mode = if args.segments {
            GeometryMode::Segment
        } else {
            GeometryMode::BeginPoint
        };
        let crs = args.crs.map(Crs::from_epsg).transpose()?;
        Ok(Self {
            source,
            output,
            extent,
            mode,
            crs,
        })
    }
}

pub(crate) fn resolve_ingest_config(args: IngestArgs) -> Result<IngestConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn execute_ingest(config: &IngestConfig) -> Result<IngestReport, CliError> {
    let source = match &config.crs {
        Some(crs) => {
            let table = read_table(&config.source).map_err(|source| CliError::ReadTable {
                path: config.source.clone(),
                source,
            })?;
            if !crs.is_geographic() && !table.has_column(GEOMETRY_COLUMN) {
                return Err(CliError::ProjectedCrsWithoutGeometry {
                    crs: crs.clone(),
                    path: config.source.clone(),
                });
            }
            IngestSource::Records(table.with_crs(crs.clone()))
        }
        None => IngestSource::Path(config.source.clone()),
    };
    let options = IngestOptions {
        output: Some(config.output.clone()),
        mode: config.mode,
    };
    Ok(ingest_report(source, &config.extent, &options)?)
}

pub(crate) fn run_ingest(args: IngestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_ingest_config(args)?;
    let report = execute_ingest(&config)?;
    writeln!(
        writer,
        "wrote {} features to {} ({} read, {} dropped, {} outside extent)",
        report.collection.len(),
        config.output,
        report.read,
        report.dropped,
        report.outside_extent
    )
    .map_err(CliError::WriteOutput)
}
