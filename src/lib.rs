//! Facade crate for the WindBreaks geometry toolkit.
//!
//! This crate re-exports the domain types and the file-backed pipeline so
//! callers can depend on a single crate.

#![forbid(unsafe_code)]

pub use windbreaks_core::{
    AttributeValue, AxisUnit, BufferSpec, Capability, CoordinateFields, Crs, Extent, Feature,
    GeometryCollection, Record, Registry, Table, buffer_collection, filter_extent,
    month_name_to_number, remove_outliers, resolve_distance, within_extent,
};

pub use windbreaks_data::{
    CombineOptions, GeometryMode, IngestError, IngestOptions, IngestReport, IngestSource,
    LayerDescription, buffer, combine_prefixed_csv, combine_years, describe_path, ingest,
    ingest_report, read_shapefile, write_shapefile,
};

/// Build the registry of every operation the workspace provides.
///
/// # Examples
/// ```
/// let registry = windbreaks::registry();
/// assert!(registry.get("ingest").is_some());
/// assert!(registry.get("within_extent").is_some());
/// ```
#[must_use]
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    windbreaks_core::register(&mut registry);
    windbreaks_data::register(&mut registry);
    registry
}
