//! `describe` command: columns, inferred types and CRS of an input file.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use windbreaks_data::{LayerDescription, SourceKind, describe_path};

use crate::{CliError, require_existing};

pub(crate) const ARG_PATH: &str = "path";
pub(crate) const ENV_PATH: &str = "WINDBREAKS_CMDS_DESCRIBE_PATH";

/// CLI arguments for the `describe` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the columns and CRS of a CSV file or shapefile")]
#[ortho_config(prefix = "WINDBREAKS")]
pub(crate) struct DescribeArgs {
    /// CSV file or shapefile to describe.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) path: Option<Utf8PathBuf>,
}

pub(crate) fn resolve_describe_path(args: DescribeArgs) -> Result<Utf8PathBuf, CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let path = merged.path.ok_or(CliError::MissingArgument {
        field: ARG_PATH,
        env: ENV_PATH,
    })?;
    require_existing(&path, ARG_PATH)?;
    if SourceKind::from_path(&path).is_none() {
        return Err(CliError::UnsupportedSource {
            field: ARG_PATH,
            path,
        });
    }
    Ok(path)
}

pub(crate) fn write_description(
    writer: &mut dyn Write,
    description: &LayerDescription,
) -> std::io::Result<()> {
    for column in &description.columns {
        writeln!(writer, "{}\t{}\t{}", column.index, column.name, column.kind)?;
    }
    writeln!(writer, "{} records", description.records)?;
    if let Some(crs) = &description.crs {
        match crs.epsg {
            Some(code) => writeln!(writer, "crs: {} (EPSG:{code}), unit: {}", crs.name, crs.unit)?,
            None => writeln!(writer, "crs: {}, unit: {}", crs.name, crs.unit)?,
        }
    }
    Ok(())
}

pub(crate) fn run_describe(args: DescribeArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let path = resolve_describe_path(args)?;
    let description = describe_path(&path)?;
    write_description(writer, &description).map_err(CliError::WriteOutput)
}
