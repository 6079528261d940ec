//! Core domain types for the WindBreaks geometry toolkit.
//!
//! The types here model storm-event style records, the closed latitude and
//! longitude extents used to select them, and the coordinate reference
//! systems their geometries are expressed in. Everything in this crate is
//! pure: file access lives in `windbreaks-data`.
//!
//! Constructors return `Result` to surface invalid input early.

pub mod buffer;
pub mod calendar;
pub mod collection;
pub mod crs;
pub mod extent;
pub mod projection;
pub mod record;
pub mod registry;
pub mod stats;

pub use buffer::{
    BufferError, BufferSpec, BufferSpecError, FEET_PER_METER, ResolvedDistance, buffer_collection,
    resolve_distance,
};
pub use calendar::{MonthNameError, month_name_to_number};
pub use collection::{Feature, GeometryCollection};
pub use crs::{AxisUnit, Crs, CrsError, CrsSummary, EpsgCode};
pub use extent::{
    Attributes, CoordinateFields, Extent, ExtentBounds, ExtentError, filter_extent, within_extent,
};
pub use projection::{ProjectionError, reproject};
pub use record::{AttributeValue, ColumnKind, ColumnSummary, Record, Table};
pub use registry::{Capability, Registry};
pub use stats::{StatsError, quantile, remove_outliers};

/// Register the capabilities provided by this crate.
///
/// # Examples
/// ```
/// use windbreaks_core::Registry;
///
/// let mut registry = Registry::new();
/// windbreaks_core::register(&mut registry);
/// assert!(registry.get("within_extent").is_some());
/// ```
pub fn register(registry: &mut Registry) {
    registry.register(Capability::new(
        "within_extent",
        "test whether either coordinate pair of a record lies in a closed extent",
    ));
    registry.register(Capability::new(
        "filter_extent",
        "keep the records whose begin or end point lies in an extent",
    ));
    registry.register(Capability::new(
        "buffer_collection",
        "buffer geometries using a distance resolved in the CRS linear unit",
    ));
    registry.register(Capability::new(
        "reproject",
        "move geometries between geographic CRSs and World Mercator",
    ));
    registry.register(Capability::new(
        "remove_outliers",
        "drop rows outside 1.5 interquartile ranges of a numeric column",
    ));
    registry.register(Capability::new(
        "month_name_to_number",
        "convert an English month name to its calendar number",
    ));
}
