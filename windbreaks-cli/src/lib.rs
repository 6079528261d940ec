//! Command-line interface for the WindBreaks geometry toolkit.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use log::debug;
use windbreaks_core::Registry;
use windbreaks_data::SourceKind;

mod buffer;
mod describe;
mod error;
mod ingest;

pub use error::CliError;

use buffer::{BufferArgs, run_buffer};
use describe::{DescribeArgs, run_describe};
use ingest::{IngestArgs, run_ingest};

/// Run the WindBreaks CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    debug!("Dispatching {:?}", cli.command);
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn run_command(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Ingest(args) => run_ingest(args, writer),
        Command::Buffer(args) => run_buffer(args, writer),
        Command::Describe(args) => run_describe(args, writer),
        Command::Capabilities => write_capabilities(&registry(), writer),
    }
}

/// Every operation the core and data crates register.
fn registry() -> Registry {
    let mut registry = Registry::new();
    windbreaks_core::register(&mut registry);
    windbreaks_data::register(&mut registry);
    registry
}

fn write_capabilities(registry: &Registry, writer: &mut dyn Write) -> Result<(), CliError> {
    for capability in registry {
        writeln!(writer, "{}\t{}", capability.name(), capability.summary())
            .map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "windbreaks",
    about = "Storm-event geometry tooling for windbreak planning",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn storm-event records into an extent-filtered shapefile.
    Ingest(IngestArgs),
    /// Buffer a shapefile layer by a unit-aware distance.
    Buffer(BufferArgs),
    /// List the columns and CRS of a CSV file or shapefile.
    Describe(DescribeArgs),
    /// List the registered operations.
    Capabilities,
}

/// Check that `path` names an existing regular file.
fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match windbreaks_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Check that `path` exists and has an extension of the expected kind.
fn require_source(path: &Utf8Path, field: &'static str, kind: SourceKind) -> Result<(), CliError> {
    require_existing(path, field)?;
    if SourceKind::from_path(path) == Some(kind) {
        Ok(())
    } else {
        Err(CliError::UnsupportedSource {
            field,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests;
