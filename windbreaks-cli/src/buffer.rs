//! `buffer` command: grow every geometry of a shapefile layer.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use windbreaks_core::{BufferSpec, GeometryCollection};
use windbreaks_data::{SourceKind, read_shapefile};

use crate::{CliError, require_source};

pub(crate) const ARG_INPUT: &str = "input";
pub(crate) const ARG_DISTANCE: &str = "distance";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_INPUT: &str = "WINDBREAKS_CMDS_BUFFER_INPUT";
pub(crate) const ENV_DISTANCE: &str = "WINDBREAKS_CMDS_BUFFER_DISTANCE";
pub(crate) const ENV_OUTPUT: &str = "WINDBREAKS_CMDS_BUFFER_OUTPUT";

/// CLI arguments for the `buffer` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Buffer every geometry of a shapefile layer. A bare number \
                 is read as kilometres on geographic and metre CRSs and as \
                 miles on foot CRSs; suffix `m` or `ft` for an explicit \
                 unit. Geographic layers are buffered in World Mercator and \
                 returned in their own CRS.",
    about = "Buffer a shapefile layer by a unit-aware distance"
)]
#[ortho_config(prefix = "WINDBREAKS")]
pub(crate) struct BufferArgs {
    /// Shapefile to buffer.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Distance such as `2`, `500m` or `1000ft`.
    #[arg(long = ARG_DISTANCE, value_name = "distance", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) distance: Option<String>,
    /// Shapefile to write; existing files are replaced.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl BufferArgs {
    fn into_config(self) -> Result<BufferConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BufferConfig::try_from(merged)
    }
}

/// Resolved `buffer` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BufferConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) distance: BufferSpec,
    pub(crate) output: Utf8PathBuf,
}

impl BufferConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_source(&self.input, ARG_INPUT, SourceKind::Shapefile)
    }
}

impl TryFrom<BufferArgs> for BufferConfig {
    type Error = CliError;

    fn try_from(args: BufferArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INPUT,
        })?;
        let raw_distance = args.distance.ok_or(CliError::MissingArgument {
            field: ARG_DISTANCE,
            env: ENV_DISTANCE,
        })?;
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT,
            env: ENV_OUTPUT,
        })?;
        Ok(Self {
            input,
            distance: BufferSpec::parse(&raw_distance)?,
            output,
        })
    }
}

pub(crate) fn execute_buffer(config: &BufferConfig) -> Result<GeometryCollection, CliError> {
    let layer = read_shapefile(&config.input)?;
    Ok(windbreaks_data::buffer(&layer, config.distance, &config.output)?)
}

pub(crate) fn run_buffer(args: BufferArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let buffered = execute_buffer(&config)?;
    writeln!(
        writer,
        "buffered {} features into {} ({})",
        buffered.len(),
        config.output,
        buffered.crs()
    )
    .map_err(CliError::WriteOutput)
}
