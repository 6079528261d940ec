//! Buffer distances expressed in the linear unit of a CRS.
//!
//! A bare number means kilometres on degree and metre systems and miles on
//! foot-based systems. Suffixed strings (`"500m"`, `"1000ft"`) carry their
//! own unit. Degree systems are buffered in World Mercator and projected
//! back. All conversions are linear.

use std::str::FromStr;

use geo::{Buffer, Geometry};
use thiserror::Error;

use crate::{AxisUnit, Crs, GeometryCollection, ProjectionError, reproject};

/// Feet in one metre, as used by the legacy deliverables.
pub const FEET_PER_METER: f64 = 3.281;
/// International feet in one statute mile.
pub const FEET_PER_MILE: f64 = 5280.0;
/// US survey feet in one statute mile.
pub const US_SURVEY_FEET_PER_MILE: f64 = 5280.010_16;
/// Metres in one kilometre.
pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// A requested buffer distance.
///
/// # Examples
/// ```
/// use windbreaks_core::BufferSpec;
///
/// # fn main() -> Result<(), windbreaks_core::BufferSpecError> {
/// assert_eq!("500m".parse::<BufferSpec>()?, BufferSpec::Meters(500.0));
/// assert_eq!("1000ft".parse::<BufferSpec>()?, BufferSpec::Feet(1000.0));
/// assert_eq!("2".parse::<BufferSpec>()?, BufferSpec::Number(2.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BufferSpec {
    /// A unitless number interpreted through the CRS unit.
    Number(f64),
    /// A distance in metres (`"…m"`).
    Meters(f64),
    /// A distance in feet (`"…ft"`).
    Feet(f64),
}

/// Errors raised when parsing a [`BufferSpec`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferSpecError {
    /// The string was empty.
    #[error("buffer distance must not be empty")]
    Empty,
    /// The numeric part did not parse.
    #[error("buffer distance {raw:?} is not a number optionally suffixed with `m` or `ft`")]
    InvalidNumber {
        /// The rejected input.
        raw: String,
    },
    /// The numeric part was `NaN` or infinite.
    #[error("buffer distance {raw:?} must be finite")]
    NonFinite {
        /// The rejected input.
        raw: String,
    },
}

impl BufferSpec {
    /// Parse a distance string. A trailing `m` wins over `ft`, matching the
    /// order the suffixes are checked in.
    pub fn parse(raw: &str) -> Result<Self, BufferSpecError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BufferSpecError::Empty);
        }
        let (number, build): (&str, fn(f64) -> Self) = if trimmed.ends_with('m') {
            (trimmed.trim_end_matches('m'), Self::Meters)
        } else if trimmed.ends_with("ft") {
            (trimmed.trim_end_matches(['f', 't']), Self::Feet)
        } else {
            (trimmed, Self::Number)
        };
        let value = number
            .trim()
            .parse::<f64>()
            .map_err(|_| BufferSpecError::InvalidNumber {
                raw: raw.to_owned(),
            })?;
        if !value.is_finite() {
            return Err(BufferSpecError::NonFinite {
                raw: raw.to_owned(),
            });
        }
        Ok(build(value))
    }
}

impl FromStr for BufferSpec {
    type Err = BufferSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<f64> for BufferSpec {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Outcome of [`resolve_distance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDistance {
    /// Distance in the linear unit the buffer is applied in.
    pub distance: f64,
    /// Whether the geometries must first move to World Mercator.
    pub reproject: bool,
}

/// Resolve a buffer distance against the unit of the collection's CRS.
///
/// Rules, in priority order:
/// 1. metres: converted to feet (× 3.281) on foot-based systems;
/// 2. feet: converted to metres (÷ 3.281) on metre systems;
/// 3. a number on a degree system: kilometres in World Mercator;
/// 4. a number on a US survey foot system: miles (× 5280.01016);
/// 5. a number on an international foot system: miles (× 5280);
/// 6. a number on a metre system: kilometres (× 1000).
///
/// Suffixed distances on a degree system are used as-is, in degrees.
///
/// # Examples
/// ```
/// use windbreaks_core::{AxisUnit, BufferSpec, resolve_distance};
///
/// let resolved = resolve_distance(BufferSpec::Meters(500.0), AxisUnit::Foot);
/// assert!((resolved.distance - 1640.5).abs() < 1e-9);
/// assert!(!resolved.reproject);
/// ```
pub fn resolve_distance(spec: BufferSpec, unit: AxisUnit) -> ResolvedDistance {
    let (distance, reproject) = match spec {
        BufferSpec::Meters(meters) if unit.is_foot() => (meters * FEET_PER_METER, false),
        BufferSpec::Meters(meters) => (meters, false),
        BufferSpec::Feet(feet) if unit == AxisUnit::Meter => (feet / FEET_PER_METER, false),
        BufferSpec::Feet(feet) => (feet, false),
        BufferSpec::Number(km) if unit == AxisUnit::Degree => (km * METERS_PER_KILOMETER, true),
        BufferSpec::Number(miles) if unit == AxisUnit::UsSurveyFoot => {
            (miles * US_SURVEY_FEET_PER_MILE, false)
        }
        BufferSpec::Number(miles) if unit == AxisUnit::Foot => (miles * FEET_PER_MILE, false),
        BufferSpec::Number(km) => (km * METERS_PER_KILOMETER, false),
    };
    ResolvedDistance {
        distance,
        reproject,
    }
}

/// Errors raised by [`buffer_collection`].
#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    /// Moving to or from World Mercator failed.
    #[error("failed to reproject geometries for buffering: {0}")]
    Projection(#[from] ProjectionError),
}

/// Buffer every geometry of `collection`, returning a new collection in the
/// original CRS. Each geometry becomes a multipolygon.
///
/// # Examples
/// ```
/// use geo::{Geometry, Point};
/// use windbreaks_core::{BufferSpec, Crs, Feature, GeometryCollection, Record, buffer_collection};
///
/// # fn main() -> Result<(), windbreaks_core::BufferError> {
/// let points = GeometryCollection::from_features(
///     Crs::nad83(),
///     vec![Feature::new(Record::new(), Geometry::Point(Point::new(-97.0, 42.0)))],
/// );
/// let buffered = buffer_collection(&points, BufferSpec::Number(1.0))?;
/// assert_eq!(buffered.crs(), &Crs::nad83());
/// assert!(matches!(buffered.features()[0].geometry, Geometry::MultiPolygon(_)));
/// # Ok(())
/// # }
/// ```
pub fn buffer_collection(
    collection: &GeometryCollection,
    spec: BufferSpec,
) -> Result<GeometryCollection, BufferError> {
    let original = collection.crs();
    let resolved = resolve_distance(spec, original.axis_unit());
    let working = if resolved.reproject {
        reproject(collection, &Crs::world_mercator())?
    } else {
        collection.clone()
    };
    let buffered = working
        .try_map_geometries(working.crs().clone(), |geometry| {
            Ok::<_, BufferError>(Geometry::MultiPolygon(geometry.buffer(resolved.distance)))
        })?;
    if buffered.crs() == original {
        Ok(buffered)
    } else {
        Ok(reproject(&buffered, original)?)
    }
}
