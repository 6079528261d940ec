//! Ellipsoidal World Mercator (EPSG:3395).
//!
//! The buffer pipeline only needs to move geometries between a geographic
//! CRS and World Mercator and back. Geographic datums are treated as
//! coincident with WGS 84; the NAD83/WGS 84 offset is below a metre at the
//! scales involved.
//!
//! Forward:
//! - `x = a·λ`
//! - `y = a·ln(tan(π/4 + φ/2)·((1 − e·sinφ)/(1 + e·sinφ))^(e/2))`
//!
//! The inverse recovers φ by fixed-point iteration on the conformal
//! latitude.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::{Coord, Geometry, MapCoords};
use thiserror::Error;

use crate::{Crs, GeometryCollection};

/// WGS 84 semi-major axis in metres.
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS 84 inverse flattening.
const INVERSE_FLATTENING: f64 = 298.257_223_563;
/// Iteration stops once successive latitudes differ by less than this.
const INVERSE_TOLERANCE: f64 = 1.0e-12;
const MAX_INVERSE_ITERATIONS: usize = 16;

/// Errors raised while reprojecting geometries.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// The coordinate cannot be projected (a pole, or not finite).
    #[error("coordinate ({x}, {y}) is outside the World Mercator domain")]
    OutOfDomain {
        /// Longitude or easting.
        x: f64,
        /// Latitude or northing.
        y: f64,
    },
    /// No transformation is available between the two systems.
    #[error("cannot reproject from {from} to {to}")]
    Unsupported {
        /// Source CRS.
        from: Crs,
        /// Target CRS.
        to: Crs,
    },
}

fn eccentricity() -> f64 {
    let flattening = INVERSE_FLATTENING.recip();
    (flattening * (2.0 - flattening)).sqrt()
}

/// Project a geographic coordinate (degrees, `x = lon`) to World Mercator
/// metres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use windbreaks_core::projection::mercator_forward;
///
/// # fn main() -> Result<(), windbreaks_core::ProjectionError> {
/// let origin = mercator_forward(Coord { x: 0.0, y: 0.0 })?;
/// assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);
/// # Ok(())
/// # }
/// ```
pub fn mercator_forward(coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
    let out_of_domain = ProjectionError::OutOfDomain {
        x: coord.x,
        y: coord.y,
    };
    if !coord.x.is_finite() || !coord.y.is_finite() || coord.y.abs() >= 90.0 {
        return Err(out_of_domain);
    }
    let e = eccentricity();
    let lambda = coord.x.to_radians();
    let phi = coord.y.to_radians();
    let e_sin = e * phi.sin();
    let conformal = (FRAC_PI_4 + phi / 2.0).tan() * ((1.0 - e_sin) / (1.0 + e_sin)).powf(e / 2.0);
    Ok(Coord {
        x: SEMI_MAJOR_AXIS * lambda,
        y: SEMI_MAJOR_AXIS * conformal.ln(),
    })
}

/// Recover a geographic coordinate (degrees) from World Mercator metres.
pub fn mercator_inverse(coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
    if !coord.x.is_finite() || !coord.y.is_finite() {
        return Err(ProjectionError::OutOfDomain {
            x: coord.x,
            y: coord.y,
        });
    }
    let e = eccentricity();
    let t = (-coord.y / SEMI_MAJOR_AXIS).exp();
    let mut phi = FRAC_PI_2 - 2.0 * t.atan();
    for _ in 0..MAX_INVERSE_ITERATIONS {
        let e_sin = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - e_sin) / (1.0 + e_sin)).powf(e / 2.0)).atan();
        let converged = (next - phi).abs() < INVERSE_TOLERANCE;
        phi = next;
        if converged {
            break;
        }
    }
    Ok(Coord {
        x: (coord.x / SEMI_MAJOR_AXIS).to_degrees(),
        y: phi.to_degrees(),
    })
}

type CoordTransform = fn(Coord<f64>) -> Result<Coord<f64>, ProjectionError>;

fn project_geometry(
    geometry: &Geometry<f64>,
    transform: CoordTransform,
) -> Result<Geometry<f64>, ProjectionError> {
    geometry.try_map_coords(transform)
}

/// Reproject a collection into `target`, returning a new collection.
///
/// Supported transformations are the identity, any geographic CRS to World
/// Mercator and World Mercator to any geographic CRS.
pub fn reproject(
    collection: &GeometryCollection,
    target: &Crs,
) -> Result<GeometryCollection, ProjectionError> {
    let source = collection.crs();
    if source == target {
        return Ok(collection.clone());
    }
    let world_mercator = Crs::world_mercator();
    let transform: CoordTransform = if source.is_geographic() && *target == world_mercator {
        mercator_forward
    } else if *source == world_mercator && target.is_geographic() {
        mercator_inverse
    } else {
        return Err(ProjectionError::Unsupported {
            from: source.clone(),
            to: target.clone(),
        });
    };
    collection.try_map_geometries(target.clone(), |geometry| {
        project_geometry(geometry, transform)
    })
}
