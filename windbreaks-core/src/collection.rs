//! Geometry-bearing records sharing one CRS.

use geo::Geometry;

use crate::{CoordinateFields, Crs, Extent, Record, filter_extent};

/// A record with its resolved geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Non-geometry attributes.
    pub record: Record,
    /// The single geometry the record resolved to.
    pub geometry: Geometry<f64>,
}

impl Feature {
    /// Pair a record with its geometry.
    pub const fn new(record: Record, geometry: Geometry<f64>) -> Self {
        Self { record, geometry }
    }
}

/// An ordered sequence of features expressed in one CRS.
///
/// # Examples
/// ```
/// use geo::{Geometry, Point};
/// use windbreaks_core::{Crs, Feature, GeometryCollection, Record};
///
/// let collection = GeometryCollection::from_features(
///     Crs::nad83(),
///     vec![Feature::new(Record::new(), Geometry::Point(Point::new(-97.0, 42.0)))],
/// );
/// assert_eq!(collection.len(), 1);
/// assert_eq!(collection.crs(), &Crs::nad83());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection {
    crs: Crs,
    features: Vec<Feature>,
}

impl GeometryCollection {
    /// Create an empty collection.
    pub const fn new(crs: Crs) -> Self {
        Self {
            crs,
            features: Vec::new(),
        }
    }

    /// Create a collection from features already expressed in `crs`.
    pub const fn from_features(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    /// The shared CRS.
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Features in order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Consume the collection, yielding its features.
    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    /// Append a feature expressed in this collection's CRS.
    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Iterate over the features.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Attribute names across all features, in order of first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for name in self.features.iter().flat_map(|feature| feature.record.names()) {
            if !columns.iter().any(|column| column == name) {
                columns.push(name.to_owned());
            }
        }
        columns
    }

    /// Build a new collection in `crs` by mapping every geometry.
    ///
    /// The receiver is left untouched.
    pub fn try_map_geometries<E>(
        &self,
        crs: Crs,
        mut map: impl FnMut(&Geometry<f64>) -> Result<Geometry<f64>, E>,
    ) -> Result<Self, E> {
        let features = self
            .features
            .iter()
            .map(|feature| {
                map(&feature.geometry).map(|geometry| Feature::new(feature.record.clone(), geometry))
            })
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self::from_features(crs, features))
    }

    /// Keep the features whose begin or end point lies in `extent`.
    #[must_use]
    pub fn filter_extent(self, extent: &Extent, fields: &CoordinateFields<'_>) -> Self {
        let features = filter_extent(self.features, extent, fields);
        Self::from_features(self.crs, features)
    }
}

impl<'a> IntoIterator for &'a GeometryCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
