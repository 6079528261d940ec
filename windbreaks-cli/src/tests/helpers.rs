//! Test helpers for composing CLI datasets and layered overrides.

use super::*;
use crate::ingest::{IngestArgs, IngestConfig, resolve_ingest_config};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Six events: three touch the plains extent, two lie outside and one has
/// no begin point.
pub(super) const STORM_EVENTS: &str = "\
EVENT_ID,EVENT_TYPE,STATE,BEGIN_LAT,BEGIN_LON,END_LAT,END_LON
1001,Hail,NEBRASKA,42.0,-97.0,42.1,-96.9
1002,Tornado,KANSAS,38.5,-98.2,38.6,-98.0
1003,Thunderstorm Wind,FLORIDA,27.9,-81.5,28.0,-81.4
1004,Hail,IOWA,,,41.5,-93.6
1005,Tornado,OKLAHOMA,34.0,-99.0,36.0,-97.5
1006,Flood,TEXAS,30.0,-97.0,30.1,-97.1
";

/// Bounds of the plains extent as `min_lat, max_lat, min_lon, max_lon`.
pub(super) const PLAINS: [f64; 4] = [35.0, 45.0, -105.0, -90.0];

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) source: Option<Utf8PathBuf>,
    pub(super) output: Option<Utf8PathBuf>,
}

/// A scratch directory holding the storm-event CSV.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let workspace = Self { _dir: dir, root };
        workspace.write("storms.csv", STORM_EVENTS);
        workspace
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn storm_events(&self) -> Utf8PathBuf {
        self.path("storms.csv")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Ingest arguments with every required value supplied.
pub(super) fn complete_ingest_args(workspace: &Workspace) -> IngestArgs {
    let [min_lat, max_lat, min_lon, max_lon] = PLAINS;
    IngestArgs {
        source: Some(workspace.storm_events()),
        output: Some(workspace.path("out/storms.shp")),
        min_lat: Some(min_lat),
        max_lat: Some(max_lat),
        min_lon: Some(min_lon),
        max_lon: Some(max_lon),
        ..IngestArgs::default()
    }
}

pub(super) fn merge_layers(
    mut cli_args: IngestArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<IngestConfig, CliError> {
    merge_field(
        &mut cli_args.source,
        extract_field(&env_layer, |layer| &layer.source),
        extract_field(&file_layer, |layer| &layer.source),
    );
    merge_field(
        &mut cli_args.output,
        extract_field(&env_layer, |layer| &layer.output),
        extract_field(&file_layer, |layer| &layer.output),
    );
    resolve_ingest_config(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}
