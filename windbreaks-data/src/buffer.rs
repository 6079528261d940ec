//! Buffer a collection and persist the result.

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use thiserror::Error;
use windbreaks_core::{BufferError, BufferSpec, GeometryCollection, buffer_collection};

use crate::{PersistError, write_shapefile};

#[derive(Debug, Error)]
pub enum BufferLayerError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("failed to persist buffered layer to {path}")]
    Persist {
        #[source]
        source: PersistError,
        path: Utf8PathBuf,
    },
}

/// Buffer every geometry of `collection` by `spec`, write the result to
/// `output` and return it.
///
/// The buffered collection is in the input CRS. The input is not modified.
/// Geometries that buffer to nothing, as a point does under a zero or
/// negative distance, stay in the returned collection but are not written.
pub fn buffer(
    collection: &GeometryCollection,
    spec: BufferSpec,
    output: &Utf8Path,
) -> Result<GeometryCollection, BufferLayerError> {
    let buffered = buffer_collection(collection, spec)?;
    let written = write_shapefile(&buffered, output).map_err(|source| {
        BufferLayerError::Persist {
            source,
            path: output.to_path_buf(),
        }
    })?;
    info!(
        "Wrote {written} of {} buffered features ({spec:?}) to {output}",
        buffered.len()
    );
    Ok(buffered)
}
