//! Closed latitude/longitude extents and the begin-or-end record filter.

use thiserror::Error;

use crate::{Feature, Record};

/// A closed bounding box in degrees.
///
/// Both bounds of each axis are inclusive. Extents are immutable once
/// constructed.
///
/// # Examples
/// ```
/// use windbreaks_core::Extent;
///
/// # fn main() -> Result<(), windbreaks_core::ExtentError> {
/// let extent = Extent::new(40.0, 45.0, -100.0, -95.0)?;
/// assert!(extent.contains(40.0, -95.0));
/// assert!(!extent.contains(39.9, -97.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "ExtentBounds", into = "ExtentBounds")
)]
pub struct Extent {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

/// The raw `min_lat, max_lat, min_lon, max_lon` mapping an [`Extent`] is
/// built from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(deny_unknown_fields)
)]
pub struct ExtentBounds {
    /// Southern bound.
    pub min_lat: f64,
    /// Northern bound.
    pub max_lat: f64,
    /// Western bound.
    pub min_lon: f64,
    /// Eastern bound.
    pub max_lon: f64,
}

/// Errors returned by [`Extent::new`].
#[derive(Debug, Error, PartialEq)]
pub enum ExtentError {
    /// A bound was `NaN` or infinite.
    #[error("extent bound {field} must be finite, got {value}")]
    NonFinite {
        /// Name of the offending bound.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The minimum exceeded the maximum on one axis.
    #[error("extent {axis} bounds are inverted: min {min} > max {max}")]
    Inverted {
        /// `"latitude"` or `"longitude"`.
        axis: &'static str,
        /// Supplied minimum.
        min: f64,
        /// Supplied maximum.
        max: f64,
    },
}

impl Extent {
    /// Validate and construct an extent.
    pub fn new(
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> Result<Self, ExtentError> {
        for (field, value) in [
            ("min_lat", min_lat),
            ("max_lat", max_lat),
            ("min_lon", min_lon),
            ("max_lon", max_lon),
        ] {
            if !value.is_finite() {
                return Err(ExtentError::NonFinite { field, value });
            }
        }
        if min_lat > max_lat {
            return Err(ExtentError::Inverted {
                axis: "latitude",
                min: min_lat,
                max: max_lat,
            });
        }
        if min_lon > max_lon {
            return Err(ExtentError::Inverted {
                axis: "longitude",
                min: min_lon,
                max: max_lon,
            });
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Southern bound.
    pub const fn min_lat(&self) -> f64 {
        self.min_lat
    }

    /// Northern bound.
    pub const fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// Western bound.
    pub const fn min_lon(&self) -> f64 {
        self.min_lon
    }

    /// Eastern bound.
    pub const fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Whether a point lies in the closed box. `NaN` coordinates never do.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

impl TryFrom<ExtentBounds> for Extent {
    type Error = ExtentError;

    fn try_from(bounds: ExtentBounds) -> Result<Self, Self::Error> {
        Self::new(
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon,
        )
    }
}

impl From<Extent> for ExtentBounds {
    fn from(extent: Extent) -> Self {
        Self {
            min_lat: extent.min_lat,
            max_lat: extent.max_lat,
            min_lon: extent.min_lon,
            max_lon: extent.max_lon,
        }
    }
}

/// Names of the two coordinate pairs tested by the extent filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFields<'a> {
    /// Latitude of the first point.
    pub begin_lat: &'a str,
    /// Longitude of the first point.
    pub begin_lon: &'a str,
    /// Latitude of the second point.
    pub end_lat: &'a str,
    /// Longitude of the second point.
    pub end_lon: &'a str,
}

impl CoordinateFields<'static> {
    /// The NOAA storm-events column names.
    pub const STORM_EVENTS: Self = Self {
        begin_lat: "BEGIN_LAT",
        begin_lon: "BEGIN_LON",
        end_lat: "END_LAT",
        end_lon: "END_LON",
    };
}

/// Anything that exposes a [`Record`] of attributes.
pub trait Attributes {
    /// The attributes to inspect.
    fn attributes(&self) -> &Record;
}

impl Attributes for Record {
    fn attributes(&self) -> &Record {
        self
    }
}

impl Attributes for Feature {
    fn attributes(&self) -> &Record {
        &self.record
    }
}

/// Whether either coordinate pair of `record` lies in `extent`.
///
/// A pair with a missing or non-numeric component is treated as outside.
/// One endpoint inside is enough: a segment crossing into the region of
/// interest is kept.
///
/// # Examples
/// ```
/// use windbreaks_core::{AttributeValue, Extent, Record, within_extent};
///
/// # fn main() -> Result<(), windbreaks_core::ExtentError> {
/// let extent = Extent::new(40.0, 45.0, -100.0, -95.0)?;
/// let record = Record::from_fields([
///     ("BEGIN_LAT", AttributeValue::Number(42.0)),
///     ("BEGIN_LON", AttributeValue::Number(-97.0)),
///     ("END_LAT", AttributeValue::Number(50.0)),
///     ("END_LON", AttributeValue::Number(-50.0)),
/// ]);
/// assert!(within_extent(&record, &extent, "BEGIN_LAT", "BEGIN_LON", "END_LAT", "END_LON"));
/// # Ok(())
/// # }
/// ```
pub fn within_extent(
    record: &Record,
    extent: &Extent,
    lat1: &str,
    lon1: &str,
    lat2: &str,
    lon2: &str,
) -> bool {
    pair_inside(record, extent, lat1, lon1) || pair_inside(record, extent, lat2, lon2)
}

fn pair_inside(record: &Record, extent: &Extent, lat: &str, lon: &str) -> bool {
    match (record.number(lat), record.number(lon)) {
        (Some(lat), Some(lon)) => extent.contains(lat, lon),
        _ => false,
    }
}

/// Keep the items whose begin or end point lies in `extent`, preserving
/// their order.
pub fn filter_extent<T, I>(items: I, extent: &Extent, fields: &CoordinateFields<'_>) -> Vec<T>
where
    T: Attributes,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .filter(|item| {
            within_extent(
                item.attributes(),
                extent,
                fields.begin_lat,
                fields.begin_lon,
                fields.end_lat,
                fields.end_lon,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeValue;
    use rstest::{fixture, rstest};

    #[fixture]
    fn plains() -> Extent {
        Extent::new(40.0, 45.0, -100.0, -95.0).expect("valid extent")
    }

    fn event(begin: (f64, f64), end: (f64, f64)) -> Record {
        Record::from_fields([
            ("BEGIN_LAT", AttributeValue::Number(begin.0)),
            ("BEGIN_LON", AttributeValue::Number(begin.1)),
            ("END_LAT", AttributeValue::Number(end.0)),
            ("END_LON", AttributeValue::Number(end.1)),
        ])
    }

    fn storm_within(record: &Record, extent: &Extent) -> bool {
        within_extent(record, extent, "BEGIN_LAT", "BEGIN_LON", "END_LAT", "END_LON")
    }

    #[rstest]
    #[case((42.0, -97.0), (50.0, -50.0), true)]
    #[case((50.0, -50.0), (42.0, -97.0), true)]
    #[case((10.0, -10.0), (10.0, -10.0), false)]
    #[case((40.0, -100.0), (0.0, 0.0), true)]
    #[case((45.0, -95.0), (0.0, 0.0), true)]
    #[case((45.000_001, -95.0), (0.0, 0.0), false)]
    fn either_endpoint_selects_record(
        plains: Extent,
        #[case] begin: (f64, f64),
        #[case] end: (f64, f64),
        #[case] expected: bool,
    ) {
        assert_eq!(storm_within(&event(begin, end), &plains), expected);
    }

    #[rstest]
    fn missing_end_point_falls_back_to_begin(plains: Extent) {
        let record = Record::from_fields([
            ("BEGIN_LAT", AttributeValue::Number(41.0)),
            ("BEGIN_LON", AttributeValue::Number(-96.0)),
        ]);
        assert!(storm_within(&record, &plains));
    }

    #[rstest]
    fn text_coordinates_are_outside(plains: Extent) {
        let record = Record::from_fields([
            ("BEGIN_LAT", AttributeValue::from("forty-one")),
            ("BEGIN_LON", AttributeValue::Number(-96.0)),
        ]);
        assert!(!storm_within(&record, &plains));
    }

    #[rstest]
    fn filter_preserves_order(plains: Extent) {
        let records = vec![
            event((41.0, -96.0), (0.0, 0.0)),
            event((10.0, -10.0), (10.0, -10.0)),
            event((0.0, 0.0), (44.0, -99.0)),
        ];
        let kept = filter_extent(records.clone(), &plains, &CoordinateFields::STORM_EVENTS);
        assert_eq!(kept, vec![records[0].clone(), records[2].clone()]);
    }

    #[rstest]
    #[case(f64::NAN, 45.0, -100.0, -95.0)]
    #[case(40.0, f64::INFINITY, -100.0, -95.0)]
    fn rejects_non_finite_bounds(
        #[case] min_lat: f64,
        #[case] max_lat: f64,
        #[case] min_lon: f64,
        #[case] max_lon: f64,
    ) {
        let err = Extent::new(min_lat, max_lat, min_lon, max_lon).expect_err("non-finite bound");
        assert!(matches!(err, ExtentError::NonFinite { .. }));
    }

    #[rstest]
    fn rejects_inverted_longitudes() {
        let err = Extent::new(40.0, 45.0, -95.0, -100.0).expect_err("inverted bounds");
        assert!(matches!(
            err,
            ExtentError::Inverted {
                axis: "longitude",
                ..
            }
        ));
    }

    #[rstest]
    fn degenerate_extent_contains_its_point() {
        let extent = Extent::new(42.0, 42.0, -97.0, -97.0).expect("degenerate extent");
        assert!(extent.contains(42.0, -97.0));
    }
}
