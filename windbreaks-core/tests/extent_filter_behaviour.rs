//! Behavioural tests for the begin-or-end extent filter.

use std::cell::{Cell, RefCell};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use windbreaks_core::{AttributeValue, Extent, Record, within_extent};

#[derive(Debug, Default)]
struct ExtentWorld {
    extent: RefCell<Option<Extent>>,
    event: RefCell<Record>,
    inside: Cell<Option<bool>>,
}

#[fixture]
fn world() -> ExtentWorld {
    ExtentWorld::default()
}

#[given("an extent from latitude {min_lat} to {max_lat} and longitude {min_lon} to {max_lon}")]
fn given_extent(world: &ExtentWorld, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) {
    let extent = Extent::new(min_lat, max_lat, min_lon, max_lon).expect("valid extent");
    world.extent.replace(Some(extent));
}

#[given("an event beginning at {begin_lat}, {begin_lon} and ending at {end_lat}, {end_lon}")]
fn given_event(world: &ExtentWorld, begin_lat: f64, begin_lon: f64, end_lat: f64, end_lon: f64) {
    world.event.replace(Record::from_fields([
        ("BEGIN_LAT", AttributeValue::Number(begin_lat)),
        ("BEGIN_LON", AttributeValue::Number(begin_lon)),
        ("END_LAT", AttributeValue::Number(end_lat)),
        ("END_LON", AttributeValue::Number(end_lon)),
    ]));
}

#[given("an event without coordinates")]
fn given_bare_event(world: &ExtentWorld) {
    world.event.replace(Record::from_fields([(
        "EVENT_TYPE",
        AttributeValue::from("Hail"),
    )]));
}

#[when("I test the event against the extent")]
fn when_test_event(world: &ExtentWorld) {
    let extent = world.extent.borrow().expect("extent configured");
    let inside = within_extent(
        &world.event.borrow(),
        &extent,
        "BEGIN_LAT",
        "BEGIN_LON",
        "END_LAT",
        "END_LON",
    );
    world.inside.set(Some(inside));
}

#[then("the event is within the extent")]
fn then_inside(world: &ExtentWorld) {
    assert_eq!(world.inside.get(), Some(true));
}

#[then("the event is outside the extent")]
fn then_outside(world: &ExtentWorld) {
    assert_eq!(world.inside.get(), Some(false));
}

#[scenario(path = "tests/features/extent_filter.feature", index = 0)]
fn begin_inside(world: ExtentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extent_filter.feature", index = 1)]
fn entirely_outside(world: ExtentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extent_filter.feature", index = 2)]
fn end_on_corner(world: ExtentWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extent_filter.feature", index = 3)]
fn no_coordinates(world: ExtentWorld) {
    let _ = world;
}
