use std::io::Read;

use camino::Utf8Path;
use dbase::FieldValue;
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use log::warn;
use shapefile::{PolygonRing, Shape};
use windbreaks_core::{AttributeValue, Crs, Feature, GeometryCollection, Record};
use windbreaks_fs::{file_is_file, open_utf8_file, sidecar_path};

use super::{ReadLayerError, shp_path};

/// Pseudo-column some `dbase` readers report for the record deletion flag.
const DELETION_FLAG: &str = "DeletionFlag";

/// Read a shapefile layer back into a collection.
///
/// The CRS comes from the `.prj` sidecar, defaulting to NAD83 when the layer
/// has none. Null shapes are skipped with a warning.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use windbreaks_data::read_shapefile;
///
/// # fn main() -> Result<(), windbreaks_data::ReadLayerError> {
/// let layer = read_shapefile(Utf8Path::new("out/storm_points.shp"))?;
/// println!("{} features in {}", layer.len(), layer.crs());
/// # Ok(())
/// # }
/// ```
pub fn read_shapefile(path: &Utf8Path) -> Result<GeometryCollection, ReadLayerError> {
    let shp = shp_path(path);
    let shapes_and_records =
        shapefile::read(&shp).map_err(|source| ReadLayerError::Shapefile {
            source,
            path: shp.clone(),
        })?;
    let dbf = sidecar_path(&shp, "dbf");
    let columns: Vec<String> = dbase::Reader::from_path(&dbf)
        .map_err(|source| ReadLayerError::Table {
            source,
            path: dbf.clone(),
        })?
        .fields()
        .iter()
        .map(|field| field.name().to_owned())
        .filter(|name| name != DELETION_FLAG)
        .collect();

    let mut collection = GeometryCollection::new(read_crs(&shp)?);
    for (index, (shape, table_record)) in shapes_and_records.into_iter().enumerate() {
        let Some(geometry) = shape_geometry(shape, index)? else {
            warn!("Skipped null shape {index} in {shp}");
            continue;
        };
        let record = Record::from_fields(columns.iter().map(|column| {
            let value = table_record.get(column).map_or(AttributeValue::Missing, attribute);
            (column.clone(), value)
        }));
        collection.push(Feature::new(record, geometry));
    }
    Ok(collection)
}

fn read_crs(shp: &Utf8Path) -> Result<Crs, ReadLayerError> {
    let prj = sidecar_path(shp, "prj");
    let read_error = |source| ReadLayerError::ReadProjection {
        source,
        path: prj.clone(),
    };
    if !file_is_file(&prj).map_err(read_error)? {
        return Ok(Crs::nad83());
    }
    let mut definition = String::new();
    open_utf8_file(&prj)
        .and_then(|mut file| file.read_to_string(&mut definition))
        .map_err(read_error)?;
    Crs::from_prj(&definition).map_err(|source| ReadLayerError::Crs {
        source,
        path: prj.clone(),
    })
}

fn coord(point: &shapefile::Point) -> Coord<f64> {
    Coord {
        x: point.x,
        y: point.y,
    }
}

fn line(points: &[shapefile::Point]) -> LineString<f64> {
    points.iter().map(coord).collect()
}

fn polygons(rings: &[PolygonRing<shapefile::Point>]) -> Vec<Polygon<f64>> {
    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push(Polygon::new(line(points), Vec::new())),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some(polygon) => polygon.interiors_push(line(points)),
                None => polygons.push(Polygon::new(line(points), Vec::new())),
            },
        }
    }
    polygons
}

fn shape_geometry(shape: Shape, index: usize) -> Result<Option<Geometry<f64>>, ReadLayerError> {
    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(point) => Geometry::Point(Point::from(coord(&point))),
        Shape::Polyline(polyline) => {
            let mut lines: Vec<LineString<f64>> =
                polyline.parts().iter().map(|part| line(part)).collect();
            if lines.len() == 1 {
                Geometry::LineString(lines.remove(0))
            } else {
                Geometry::MultiLineString(MultiLineString::new(lines))
            }
        }
        Shape::Polygon(polygon) => {
            let mut parts = polygons(polygon.rings());
            if parts.len() == 1 {
                Geometry::Polygon(parts.remove(0))
            } else {
                Geometry::MultiPolygon(MultiPolygon::new(parts))
            }
        }
        Shape::Multipoint(multipoint) => Geometry::MultiPoint(MultiPoint::new(
            multipoint
                .points()
                .iter()
                .map(|point| Point::from(coord(point)))
                .collect(),
        )),
        other => {
            return Err(ReadLayerError::UnsupportedShape {
                index,
                shape_type: format!("{:?}", other.shapetype()),
            });
        }
    };
    Ok(Some(geometry))
}

fn attribute(value: &FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(text)) | FieldValue::Memo(text) => {
            let trimmed = text.trim_end();
            if trimmed.is_empty() {
                AttributeValue::Missing
            } else {
                AttributeValue::Text(trimmed.to_owned())
            }
        }
        FieldValue::Numeric(Some(number)) | FieldValue::Double(number) | FieldValue::Currency(number) => {
            AttributeValue::from(*number)
        }
        FieldValue::Float(Some(number)) => AttributeValue::from(f64::from(*number)),
        FieldValue::Integer(number) => AttributeValue::Number(f64::from(*number)),
        FieldValue::Logical(Some(flag)) => AttributeValue::Text(flag.to_string()),
        FieldValue::Date(Some(date)) => AttributeValue::Text(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Missing,
        other => AttributeValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn outer_rings_start_new_polygons() {
        let square = |offset: f64| {
            vec![
                shapefile::Point::new(offset, 0.0),
                shapefile::Point::new(offset, 1.0),
                shapefile::Point::new(offset + 1.0, 1.0),
                shapefile::Point::new(offset, 0.0),
            ]
        };
        let rings = vec![
            PolygonRing::Outer(square(0.0)),
            PolygonRing::Inner(square(0.25)),
            PolygonRing::Outer(square(5.0)),
        ];
        let built = polygons(&rings);
        assert_eq!(built.len(), 2);
        assert_eq!(built[0].interiors().len(), 1);
        assert!(built[1].interiors().is_empty());
    }

    #[rstest]
    #[case(FieldValue::Character(Some("Hail  ".into())), AttributeValue::Text("Hail".into()))]
    #[case(FieldValue::Character(None), AttributeValue::Missing)]
    #[case(FieldValue::Numeric(Some(42.5)), AttributeValue::Number(42.5))]
    #[case(FieldValue::Numeric(None), AttributeValue::Missing)]
    #[case(FieldValue::Integer(7), AttributeValue::Number(7.0))]
    #[case(FieldValue::Logical(Some(true)), AttributeValue::Text("true".into()))]
    fn maps_field_values(#[case] value: FieldValue, #[case] expected: AttributeValue) {
        assert_eq!(attribute(&value), expected);
    }

    #[rstest]
    fn null_shapes_are_skipped() {
        assert!(matches!(shape_geometry(Shape::NullShape, 0), Ok(None)));
    }
}
