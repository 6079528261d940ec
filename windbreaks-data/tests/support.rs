//! Shared helpers for the `windbreaks-data` integration tests.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use windbreaks_core::Extent;

/// Directory holding the CSV fixtures.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Path of a named fixture.
pub fn fixture(name: &str) -> Utf8PathBuf {
    fixtures_dir().join(name)
}

/// Latitude 35..45, longitude -105..-90: the central plains.
pub fn plains() -> Extent {
    Extent::new(35.0, 45.0, -105.0, -90.0).expect("valid extent")
}

/// A scratch directory and its UTF-8 path.
pub fn scratch_dir() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    (dir, path)
}

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write_fixture(dir: &Utf8Path, name: &str, contents: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    windbreaks_fs::write_file(&path, contents).expect("write fixture");
    path
}
