//! Angle, geodesy and nalgebra helpers shared by the fusion components

use nalgebra::Vector3;

/// Mean Earth radius of the spherical model, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Conversion factor from meters per second to knots.
pub const MS_TO_KNOTS: f64 = 1.943_844;

/// Wrap an angle in degrees into `[0, 360)`.
///
/// # Example
/// ```
/// use fusion_wind::wrap_degrees;
///
/// assert_eq!(wrap_degrees(-90.0), 270.0);
/// assert_eq!(wrap_degrees(360.0), 0.0);
/// assert_eq!(wrap_degrees(725.0), 5.0);
/// ```
#[inline]
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Round to two decimals, the display/logging precision of every output.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Great-circle distance in meters between two points (haversine).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from point 1 to point 2, degrees in `[0, 360)`.
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    wrap_degrees(y.atan2(x).to_degrees())
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning `None` if its magnitude is zero or not finite
    fn try_normalize_finite(&self) -> Option<Vector3<f64>>;

    /// Whether every component is finite
    fn is_finite(&self) -> bool;
}

impl Vector3Ext for Vector3<f64> {
    fn try_normalize_finite(&self) -> Option<Vector3<f64>> {
        let magnitude = self.magnitude();
        if magnitude > 0.0 && magnitude.is_finite() {
            Some(*self / magnitude)
        } else {
            None
        }
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|component| component.is_finite())
    }
}
