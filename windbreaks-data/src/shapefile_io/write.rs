use camino::Utf8Path;
use dbase::{FieldName, FieldValue, TableWriterBuilder};
use geo::{Coord, Geometry, HasDimensions, LineString, Polygon};
use log::warn;
use shapefile::{Multipoint, Point, PolygonRing, Polyline, Writer, record::EsriShape};
use windbreaks_core::{AttributeValue, Feature, GeometryCollection, Record};
use windbreaks_fs::{ensure_parent_dir, sidecar_path, write_file};

use super::{MAX_FIELD_NAME_LEN, PersistError, ShapeFamily, shp_path};

/// Character fields are clamped to this many bytes.
const MAX_CHARACTER_LEN: usize = 254;
const NUMERIC_FIELD_LEN: u8 = 20;
const NUMERIC_DECIMALS: u8 = 8;

/// A dBase column and the attribute it is filled from.
struct Field {
    column: String,
    name: String,
    numeric: bool,
    width: u8,
}

/// Write `collection` as a shapefile layer at `path`, replacing any
/// existing layer.
///
/// The `.shp` extension is added when `path` has none. Features whose
/// geometry is empty are skipped with a warning, and a collection with no
/// remaining features is written as an empty point layer.
///
/// Returns the number of features written.
pub fn write_shapefile(
    collection: &GeometryCollection,
    path: &Utf8Path,
) -> Result<usize, PersistError> {
    let shp = shp_path(path);
    ensure_parent_dir(&shp).map_err(|source| PersistError::CreateDir {
        source,
        path: shp.clone(),
    })?;

    let features = writable_features(collection, &shp);
    let fields = plan_fields(collection)?;
    let records: Vec<dbase::Record> = features
        .iter()
        .map(|(_, feature)| dbase_record(&feature.record, &fields))
        .collect();
    let family = layer_family(&features)?;
    match family {
        ShapeFamily::Point => write_layer(&shp, &fields, &features, &records, to_point),
        ShapeFamily::Polyline => write_layer(&shp, &fields, &features, &records, to_polyline),
        ShapeFamily::Polygon => write_layer(&shp, &fields, &features, &records, to_polygon),
        ShapeFamily::Multipoint => write_layer(&shp, &fields, &features, &records, to_multipoint),
    }?;

    let prj = sidecar_path(&shp, "prj");
    write_file(&prj, collection.crs().to_wkt())
        .map_err(|source| PersistError::Projection { source, path: prj })?;
    Ok(features.len())
}

/// Features with a non-empty geometry, paired with their index in the
/// collection.
fn writable_features<'a>(
    collection: &'a GeometryCollection,
    shp: &Utf8Path,
) -> Vec<(usize, &'a Feature)> {
    collection
        .iter()
        .enumerate()
        .filter(|(index, feature)| {
            let empty = feature.geometry.is_empty();
            if empty {
                warn!("Skipped feature {index} with an empty geometry while writing {shp}");
            }
            !empty
        })
        .collect()
}

type Convert<S> = fn(&Geometry<f64>, usize) -> Result<S, PersistError>;

fn write_layer<S: EsriShape>(
    shp: &Utf8Path,
    fields: &[Field],
    features: &[(usize, &Feature)],
    records: &[dbase::Record],
    convert: Convert<S>,
) -> Result<(), PersistError> {
    let shapes = features
        .iter()
        .map(|(index, feature)| convert(&feature.geometry, *index))
        .collect::<Result<Vec<S>, _>>()?;
    let shapefile_error = |source| PersistError::Shapefile {
        source,
        path: shp.to_path_buf(),
    };
    let mut writer = Writer::from_path(shp, table_builder(fields)?).map_err(shapefile_error)?;
    for (shape, record) in shapes.iter().zip(records) {
        writer
            .write_shape_and_record(shape, record)
            .map_err(shapefile_error)?;
    }
    Ok(())
}

fn family(geometry: &Geometry<f64>, index: usize) -> Result<ShapeFamily, PersistError> {
    match geometry {
        Geometry::Point(_) => Ok(ShapeFamily::Point),
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            Ok(ShapeFamily::Polyline)
        }
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Ok(ShapeFamily::Polygon),
        Geometry::MultiPoint(_) => Ok(ShapeFamily::Multipoint),
        Geometry::GeometryCollection(_) => Err(PersistError::UnsupportedGeometry { index }),
    }
}

fn layer_family(features: &[(usize, &Feature)]) -> Result<ShapeFamily, PersistError> {
    let mut expected = None;
    for &(index, feature) in features {
        let found = family(&feature.geometry, index)?;
        match expected {
            None => expected = Some(found),
            Some(layer) if layer != found => {
                return Err(PersistError::MixedGeometry {
                    index,
                    expected: layer,
                    found,
                });
            }
            Some(_) => {}
        }
    }
    Ok(expected.unwrap_or(ShapeFamily::Point))
}

fn shp_point(coord: Coord<f64>) -> Point {
    Point::new(coord.x, coord.y)
}

fn to_point(geometry: &Geometry<f64>, index: usize) -> Result<Point, PersistError> {
    match geometry {
        Geometry::Point(point) => Ok(shp_point(point.0)),
        _ => Err(PersistError::DegenerateGeometry { index }),
    }
}

fn line_part(line: &LineString<f64>, index: usize) -> Result<Vec<Point>, PersistError> {
    if line.0.len() < 2 {
        return Err(PersistError::DegenerateGeometry { index });
    }
    Ok(line.coords().copied().map(shp_point).collect())
}

fn to_polyline(geometry: &Geometry<f64>, index: usize) -> Result<Polyline, PersistError> {
    let parts = match geometry {
        Geometry::Line(line) => vec![vec![shp_point(line.start), shp_point(line.end)]],
        Geometry::LineString(line) => vec![line_part(line, index)?],
        Geometry::MultiLineString(lines) => lines
            .iter()
            .map(|line| line_part(line, index))
            .collect::<Result<_, _>>()?,
        _ => return Err(PersistError::DegenerateGeometry { index }),
    };
    if parts.is_empty() {
        return Err(PersistError::DegenerateGeometry { index });
    }
    Ok(Polyline::with_parts(parts))
}

fn ring_points(ring: &LineString<f64>, index: usize) -> Result<Vec<Point>, PersistError> {
    if ring.0.len() < 3 {
        return Err(PersistError::DegenerateGeometry { index });
    }
    Ok(ring.coords().copied().map(shp_point).collect())
}

fn polygon_rings(
    polygon: &Polygon<f64>,
    index: usize,
    rings: &mut Vec<PolygonRing<Point>>,
) -> Result<(), PersistError> {
    rings.push(PolygonRing::Outer(ring_points(polygon.exterior(), index)?));
    for interior in polygon.interiors() {
        rings.push(PolygonRing::Inner(ring_points(interior, index)?));
    }
    Ok(())
}

fn to_polygon(geometry: &Geometry<f64>, index: usize) -> Result<shapefile::Polygon, PersistError> {
    let mut rings = Vec::new();
    match geometry {
        Geometry::Polygon(polygon) => polygon_rings(polygon, index, &mut rings)?,
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                polygon_rings(polygon, index, &mut rings)?;
            }
        }
        Geometry::Rect(rect) => polygon_rings(&rect.to_polygon(), index, &mut rings)?,
        Geometry::Triangle(triangle) => {
            polygon_rings(&triangle.to_polygon(), index, &mut rings)?;
        }
        _ => return Err(PersistError::DegenerateGeometry { index }),
    }
    if rings.is_empty() {
        return Err(PersistError::DegenerateGeometry { index });
    }
    Ok(shapefile::Polygon::with_rings(rings))
}

fn to_multipoint(geometry: &Geometry<f64>, index: usize) -> Result<Multipoint, PersistError> {
    match geometry {
        Geometry::MultiPoint(points) if !points.0.is_empty() => Ok(Multipoint::new(
            points.iter().map(|point| shp_point(point.0)).collect(),
        )),
        _ => Err(PersistError::DegenerateGeometry { index }),
    }
}

/// Choose dBase names and types for the collection's columns.
fn plan_fields(collection: &GeometryCollection) -> Result<Vec<Field>, PersistError> {
    let mut fields: Vec<Field> = Vec::new();
    for column in collection.columns() {
        let name: String = column.chars().take(MAX_FIELD_NAME_LEN).collect();
        if let Some(existing) = fields.iter().find(|field| field.name == name) {
            return Err(PersistError::DuplicateField {
                first: existing.column.clone(),
                second: column,
                field: name,
            });
        }
        let numeric = collection.iter().all(|feature| {
            matches!(
                feature.record.get(&column),
                None | Some(AttributeValue::Missing | AttributeValue::Number(_))
            )
        });
        let longest = collection
            .iter()
            .filter_map(|feature| feature.record.get(&column))
            .map(|value| value.to_string().len())
            .max()
            .unwrap_or(1);
        let width = u8::try_from(longest.clamp(1, MAX_CHARACTER_LEN)).unwrap_or(u8::MAX);
        fields.push(Field {
            column,
            name,
            numeric,
            width,
        });
    }
    Ok(fields)
}

fn field_name(field: &Field) -> Result<FieldName, PersistError> {
    FieldName::try_from(field.name.as_str()).map_err(|_| PersistError::FieldName {
        column: field.column.clone(),
    })
}

fn table_builder(fields: &[Field]) -> Result<TableWriterBuilder, PersistError> {
    let mut builder = TableWriterBuilder::new();
    for field in fields {
        let name = field_name(field)?;
        builder = if field.numeric {
            builder.add_numeric_field(name, NUMERIC_FIELD_LEN, NUMERIC_DECIMALS)
        } else {
            builder.add_character_field(name, field.width)
        };
    }
    Ok(builder)
}

fn truncate(text: &str) -> String {
    let mut end = text.len().min(MAX_CHARACTER_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.get(..end).unwrap_or_default().to_owned()
}

fn dbase_record(record: &Record, fields: &[Field]) -> dbase::Record {
    let mut out = dbase::Record::default();
    for field in fields {
        let value = record.get(&field.column);
        let cell = if field.numeric {
            FieldValue::Numeric(value.and_then(AttributeValue::as_number))
        } else {
            FieldValue::Character(
                value
                    .filter(|value| !value.is_missing())
                    .map(|value| truncate(&value.to_string())),
            )
        };
        out.insert(field.name.clone(), cell);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, Point as GeoPoint};
    use rstest::rstest;
    use windbreaks_core::Crs;

    fn feature(record: Record, geometry: Geometry<f64>) -> Feature {
        Feature::new(record, geometry)
    }

    fn indexed(collection: &GeometryCollection) -> Vec<(usize, &Feature)> {
        collection.iter().enumerate().collect()
    }

    #[rstest]
    fn mixed_families_are_rejected() {
        let collection = GeometryCollection::from_features(
            Crs::nad83(),
            vec![
                feature(Record::new(), Geometry::Point(GeoPoint::new(0.0, 0.0))),
                feature(
                    Record::new(),
                    Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
                ),
            ],
        );
        assert!(matches!(
            layer_family(&indexed(&collection)),
            Err(PersistError::MixedGeometry {
                index: 1,
                expected: ShapeFamily::Point,
                found: ShapeFamily::Polyline,
            })
        ));
    }

    #[rstest]
    fn polygons_and_multipolygons_share_a_layer() {
        let square = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let collection = GeometryCollection::from_features(
            Crs::nad83(),
            vec![
                feature(Record::new(), Geometry::Polygon(square.clone())),
                feature(
                    Record::new(),
                    Geometry::MultiPolygon(MultiPolygon::new(vec![square])),
                ),
            ],
        );
        assert!(matches!(
            layer_family(&indexed(&collection)),
            Ok(ShapeFamily::Polygon)
        ));
    }

    #[rstest]
    fn empty_geometries_are_not_written() {
        let collection = GeometryCollection::from_features(
            Crs::nad83(),
            vec![
                feature(Record::new(), Geometry::MultiPolygon(MultiPolygon::new(vec![]))),
                feature(Record::new(), Geometry::Point(GeoPoint::new(1.0, 2.0))),
                feature(Record::new(), Geometry::LineString(LineString::new(vec![]))),
            ],
        );
        let kept: Vec<usize> = writable_features(&collection, Utf8Path::new("layer.shp"))
            .into_iter()
            .map(|(index, _)| index)
            .collect();
        assert_eq!(kept, vec![1]);
    }

    #[rstest]
    fn empty_multipolygon_is_degenerate() {
        let empty = Geometry::MultiPolygon(MultiPolygon::<f64>::new(vec![]));
        assert!(matches!(
            to_polygon(&empty, 3),
            Err(PersistError::DegenerateGeometry { index: 3 })
        ));
    }

    #[rstest]
    fn long_column_names_are_truncated_and_collisions_reported() {
        let record = Record::from_fields([
            ("EPISODE_NARRATIVE", AttributeValue::from("a")),
            ("EPISODE_NARRATIVE_2", AttributeValue::from("b")),
        ]);
        let collection = GeometryCollection::from_features(
            Crs::nad83(),
            vec![feature(record, Geometry::Point(GeoPoint::new(0.0, 0.0)))],
        );
        match plan_fields(&collection) {
            Err(PersistError::DuplicateField { field, .. }) => assert_eq!(field, "EPISODE_NA"),
            other => panic!("expected duplicate field, got {:?}", other.map(|f| f.len())),
        }
    }

    #[rstest]
    fn numeric_columns_allow_missing_cells() {
        let collection = GeometryCollection::from_features(
            Crs::nad83(),
            vec![
                feature(
                    Record::from_fields([("DAMAGE", AttributeValue::Number(5.0))]),
                    Geometry::Point(GeoPoint::new(0.0, 0.0)),
                ),
                feature(
                    Record::from_fields([("DAMAGE", AttributeValue::Missing)]),
                    Geometry::Point(GeoPoint::new(1.0, 1.0)),
                ),
            ],
        );
        let fields = plan_fields(&collection).expect("valid fields");
        assert!(fields.iter().all(|field| field.numeric));
    }

    #[rstest]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(200);
        let truncated = truncate(&text);
        assert!(truncated.len() <= MAX_CHARACTER_LEN);
        assert!(truncated.chars().all(|ch| ch == 'é'));
    }
}
