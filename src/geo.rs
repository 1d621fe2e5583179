//! Geographic projection helpers
//!
//! Latitude/longitude are in degrees everywhere in this module. Positions on
//! the sphere use the y-up convention of the rest of the crate: the north pole
//! sits at +Y and longitude 0 faces +X while the globe group is unrotated.

use glam::{DVec3, Vec3};
use serde::Serialize;

/// A point on the globe in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub long: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Position of this point on a sphere of `radius`
    pub fn to_vector(self, radius: f64) -> Vec3 {
        geo_to_unit_vector(self.lat, self.long, radius)
    }

    /// Great-circle midpoint between `self` and `other`
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        let (lat, long) = geodesic_midpoint(self.lat, self.long, other.lat, other.long);
        GeoPoint { lat, long }
    }
}

/// Convert latitude/longitude to a point on a sphere of `radius`.
///
/// Inputs are not range-checked; callers keep `lat` in [-90, 90] and `long`
/// in [-180, 180].
pub fn geo_to_unit_vector(lat: f64, long: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (long + 180.0).to_radians();

    let v = DVec3::new(
        -(phi.sin() * theta.cos()),
        phi.cos(),
        phi.sin() * theta.sin(),
    ) * radius;
    v.as_vec3()
}

/// Great-circle midpoint of two points, degrees in and out.
pub fn geodesic_midpoint(lat1: f64, long1: f64, lat2: f64, long2: f64) -> (f64, f64) {
    let (lat1, long1) = (lat1.to_radians(), long1.to_radians());
    let (lat2, long2) = (lat2.to_radians(), long2.to_radians());

    let delta_long = long2 - long1;
    let bx = lat2.cos() * delta_long.cos();
    let by = lat2.cos() * delta_long.sin();

    let mid_lat = (lat1.sin() + lat2.sin())
        .atan2(((lat1.cos() + bx) * (lat1.cos() + bx) + by * by).sqrt());
    let mid_long = long1 + by.atan2(lat1.cos() + bx);

    (mid_lat.to_degrees(), mid_long.to_degrees())
}

/// Linearly remap `value` from `[min, max]` to `[a, b]`.
///
/// A degenerate source range maps everything to `a`.
pub fn normalize(value: f64, min: f64, max: f64, a: f64, b: f64) -> f64 {
    let t = (value - min) / (max - min);
    let t = if t.is_finite() { t } else { 0.0 };
    (b - a) * t + a
}
