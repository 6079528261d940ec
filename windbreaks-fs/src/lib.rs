//! Filesystem helpers for WindBreaks layers, built on `cap-std` and `camino`.
//!
//! Every operation opens an ambient directory for the path's anchor (the
//! filesystem root, a Windows prefix, or the current directory) and works
//! relative to it.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Split `path` into its anchor and the remainder below it.
fn split_anchor(path: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut anchor = Utf8PathBuf::new();
    let mut rest = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => anchor.push(component),
            Utf8Component::CurDir => {}
            other => rest.push(other),
        }
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    (anchor, rest)
}

/// Open the ambient anchor of `path`, returning it with the relative
/// remainder.
pub fn anchored_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let (anchor, rest) = split_anchor(path);
    let dir = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, rest))
}

/// Open the directory containing `path` and return it with the file name.
fn parent_dir_and_name(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Open a UTF-8 file path for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let (dir, relative) = anchored_dir(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    dir.create_dir_all(&relative)
}

/// Write `contents` to `path`, creating parent directories and replacing any
/// existing file.
pub fn write_file(path: &Utf8Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = parent_dir_and_name(path)?;
    dir.write(name.as_str(), contents)
}

/// Whether `path` exists and is a regular file.
///
/// A missing parent directory is reported as an error, not `false`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = parent_dir_and_name(path)?;
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Names of the regular files directly inside `dir`, sorted.
pub fn list_file_names(dir: &Utf8Path) -> io::Result<Vec<String>> {
    let handle = fs_utf8::Dir::open_ambient_dir(dir, ambient_authority())?;
    let mut names = Vec::new();
    for entry in handle.entries()? {
        let file = entry?;
        if file.file_type()?.is_file() {
            names.push(file.file_name()?);
        }
    }
    names.sort();
    Ok(names)
}

/// The path of a sidecar file sharing `path`'s stem, such as the `.dbf`
/// next to a `.shp`.
#[must_use]
pub fn sidecar_path(path: &Utf8Path, extension: &str) -> Utf8PathBuf {
    path.with_extension(extension)
}
