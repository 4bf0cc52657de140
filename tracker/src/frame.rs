//! Inertial (TEME) to Earth-fixed geodetic conversion.
//!
//! The Earth-fixed frame is the inertial frame rotated about the z axis by the
//! Greenwich Mean Sidereal Time. Latitude is geocentric: the Earth is treated
//! as a sphere, which is off by up to ~0.2° against an ellipsoidal model.

use na::Vector3;
use tle_types::prelude::{GeodeticPoint, InertialState, DAYS_PER_JULIAN_CENTURY, J2000_JD};

use crate::{propagator::PropagationError, units::JulianDate};

const GMST_AT_J2000_DEG: f64 = 280.46061837;
const GMST_RATE_DEG_PER_DAY: f64 = 360.98564736629;
const GMST_T2_COEFF: f64 = 0.000387933;
const GMST_T3_DIVISOR: f64 = 38710000.0;

/// Raw GMST polynomial [deg], not reduced to a single turn
pub fn gmst_degrees_unnormalized(jd: f64) -> f64 {
    let d = jd - J2000_JD;
    let t = d / DAYS_PER_JULIAN_CENTURY;
    GMST_AT_J2000_DEG + GMST_RATE_DEG_PER_DAY * d + GMST_T2_COEFF * t * t
        - t * t * t / GMST_T3_DIVISOR
}

/// GMST [deg] in [0, 360)
pub fn gmst_degrees(jd: f64) -> f64 {
    let gmst = gmst_degrees_unnormalized(jd).rem_euclid(360.0);
    if gmst >= 360.0 {
        0.0
    } else {
        gmst
    }
}

/// Rotate a TEME position into the Earth-fixed frame
pub fn inertial_to_earth_fixed(position: &Vector3<f64>, jd: f64) -> Vector3<f64> {
    let (sin_theta, cos_theta) = gmst_degrees(jd).to_radians().sin_cos();
    Vector3::new(
        cos_theta * position.x + sin_theta * position.y,
        -sin_theta * position.x + cos_theta * position.y,
        position.z,
    )
}

/// Subpoint of a TEME position at `jd`.
///
/// Longitude is in (-180, 180].
pub fn inertial_to_geodetic(
    position: &Vector3<f64>,
    jd: f64,
) -> Result<GeodeticPoint, PropagationError> {
    let ecef = inertial_to_earth_fixed(position, jd);
    let r = ecef.norm();
    if r == 0.0 || !r.is_finite() {
        return Err(PropagationError::Degenerate(format!(
            "cannot place position {position} on the globe"
        )));
    }

    let latitude_deg = (ecef.z / r).clamp(-1.0, 1.0).asin().to_degrees();
    let mut longitude_deg = ecef.y.atan2(ecef.x).to_degrees();
    if longitude_deg <= -180.0 {
        longitude_deg = 180.0;
    }
    Ok(GeodeticPoint::new(latitude_deg, longitude_deg))
}

pub fn subpoint(state: &InertialState, jd: JulianDate) -> Result<GeodeticPoint, PropagationError> {
    inertial_to_geodetic(&state.position, jd.as_f64())
}
