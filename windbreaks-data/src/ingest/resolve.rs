//! Turning one record into one geometry.

use std::str::FromStr;

use geo::{Coord, Geometry, HasDimensions, LineString, Point};
use windbreaks_core::{AttributeValue, CoordinateFields, Record};
use wkt::Wkt;

/// How to build a geometry for a record without a `geometry` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryMode {
    /// `Point(BEGIN_LON, BEGIN_LAT)`.
    #[default]
    BeginPoint,
    /// A two-point line from the begin point to the end point.
    Segment,
}

/// Why a record could not be given a geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Unresolved {
    MissingGeometry,
    EmptyGeometry,
    InvalidWkt(String),
    MissingCoordinates,
}

/// Parse WKT into a geometry.
pub(crate) fn parse_wkt(text: &str) -> Result<Geometry<f64>, String> {
    Wkt::<f64>::from_str(text)
        .map_err(|err| format!("{err:?}"))
        .and_then(|parsed| Geometry::try_from(parsed).map_err(|err| format!("{err:?}")))
}

fn coordinate(record: &Record, lat: &str, lon: &str) -> Option<Coord<f64>> {
    Some(Coord {
        x: record.number(lon)?,
        y: record.number(lat)?,
    })
}

/// Resolve the geometry of `record`.
///
/// `wkt` holds the value of the `geometry` column when the source has one;
/// it takes precedence over the coordinate fields.
pub(crate) fn resolve_geometry(
    record: &Record,
    wkt: Option<&AttributeValue>,
    mode: GeometryMode,
    fields: &CoordinateFields<'_>,
) -> Result<Geometry<f64>, Unresolved> {
    if let Some(value) = wkt {
        return match value {
            AttributeValue::Text(text) => {
                let geometry = parse_wkt(text).map_err(Unresolved::InvalidWkt)?;
                if geometry.is_empty() {
                    Err(Unresolved::EmptyGeometry)
                } else {
                    Ok(geometry)
                }
            }
            AttributeValue::Missing | AttributeValue::Number(_) => {
                Err(Unresolved::MissingGeometry)
            }
        };
    }
    let begin = coordinate(record, fields.begin_lat, fields.begin_lon)
        .ok_or(Unresolved::MissingCoordinates)?;
    match mode {
        GeometryMode::BeginPoint => Ok(Geometry::Point(Point::from(begin))),
        GeometryMode::Segment => {
            let end = coordinate(record, fields.end_lat, fields.end_lon)
                .ok_or(Unresolved::MissingCoordinates)?;
            Ok(Geometry::LineString(LineString::new(vec![begin, end])))
        }
    }
}
