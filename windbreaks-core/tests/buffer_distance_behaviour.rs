//! Behavioural tests for unit-aware buffer distances.

use std::cell::RefCell;

use geo::{Geometry, Point};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use windbreaks_core::{
    BufferSpec, Crs, Feature, GeometryCollection, Record, ResolvedDistance, buffer_collection,
    resolve_distance,
};

#[derive(Debug)]
struct BufferWorld {
    layer: RefCell<GeometryCollection>,
    resolved: RefCell<Option<ResolvedDistance>>,
    buffered: RefCell<Option<GeometryCollection>>,
}

#[fixture]
fn world() -> BufferWorld {
    BufferWorld {
        layer: RefCell::new(GeometryCollection::new(Crs::nad83())),
        resolved: RefCell::new(None),
        buffered: RefCell::new(None),
    }
}

fn parse_spec(raw: &str) -> BufferSpec {
    raw.trim_matches('"').parse().expect("valid buffer distance")
}

#[given("a layer in EPSG {code}")]
fn given_layer(world: &BufferWorld, code: u32) {
    let crs = Crs::from_epsg(code).expect("known EPSG code");
    world.layer.replace(GeometryCollection::new(crs));
}

#[given("a point at latitude {lat} and longitude {lon} in EPSG {code}")]
fn given_point(world: &BufferWorld, lat: f64, lon: f64, code: u32) {
    let crs = Crs::from_epsg(code).expect("known EPSG code");
    world.layer.replace(GeometryCollection::from_features(
        crs,
        vec![Feature::new(Record::new(), Geometry::Point(Point::new(lon, lat)))],
    ));
}

#[when("I resolve the buffer distance {raw}")]
fn when_resolve(world: &BufferWorld, raw: String) {
    let unit = world.layer.borrow().crs().axis_unit();
    world
        .resolved
        .replace(Some(resolve_distance(parse_spec(&raw), unit)));
}

#[when("I buffer the layer by {raw}")]
fn when_buffer(world: &BufferWorld, raw: String) {
    let buffered =
        buffer_collection(&world.layer.borrow(), parse_spec(&raw)).expect("buffer succeeds");
    world.buffered.replace(Some(buffered));
}

#[then("the resolved distance is {expected}")]
fn then_distance(world: &BufferWorld, expected: f64) {
    let resolved = world.resolved.borrow().expect("distance resolved");
    assert!(
        (resolved.distance - expected).abs() <= 1e-9,
        "expected {expected}, got {}",
        resolved.distance
    );
}

#[then("the layer stays in its own CRS")]
fn then_not_reprojected(world: &BufferWorld) {
    let resolved = world.resolved.borrow().expect("distance resolved");
    assert!(!resolved.reproject);
}

#[then("the layer is buffered in World Mercator")]
fn then_reprojected(world: &BufferWorld) {
    let resolved = world.resolved.borrow().expect("distance resolved");
    assert!(resolved.reproject);
}

#[then("the buffered layer is in EPSG {code}")]
fn then_buffered_crs(world: &BufferWorld, code: u32) {
    let buffered = world.buffered.borrow();
    let buffered = buffered.as_ref().expect("layer buffered");
    assert_eq!(buffered.crs().epsg(), Some(code));
}

#[then("every buffered geometry is a multipolygon")]
fn then_multipolygons(world: &BufferWorld) {
    let buffered = world.buffered.borrow();
    let buffered = buffered.as_ref().expect("layer buffered");
    assert!(!buffered.is_empty());
    assert!(
        buffered
            .iter()
            .all(|feature| matches!(feature.geometry, Geometry::MultiPolygon(_)))
    );
}

#[scenario(path = "tests/features/buffer_distance.feature", index = 0)]
fn survey_feet_miles(world: BufferWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/buffer_distance.feature", index = 1)]
fn metres_on_foot_crs(world: BufferWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/buffer_distance.feature", index = 2)]
fn feet_on_metre_crs(world: BufferWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/buffer_distance.feature", index = 3)]
fn kilometres_on_geographic_crs(world: BufferWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/buffer_distance.feature", index = 4)]
fn geographic_round_trip(world: BufferWorld) {
    let _ = world;
}
