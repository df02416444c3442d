/*!
 * # Geodesic distance
 *
 * Surface distance between two coordinates. The primary model is the WGS84
 * ellipsoid solved with Karney's geodesic inverse, which converges for every
 * pair of points including nearly antipodal ones. The spherical haversine
 * distance is exposed as well for callers that want the cheaper estimate.
 */

use geographiclib_rs::{Geodesic, InverseGeodesic};
use once_cell::sync::Lazy;

use crate::models::Coordinate;

/// IUGG mean Earth radius in meters.
pub const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

static WGS84: Lazy<Geodesic> = Lazy::new(Geodesic::wgs84);

/// Geodesic distance in meters between `a` and `b` on the WGS84 ellipsoid.
///
/// Total over valid coordinates and returns 0 for identical points.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    let meters: f64 = WGS84.inverse(a.latitude, a.longitude, b.latitude, b.longitude);
    meters.abs()
}

/// Great-circle distance in meters on a sphere of [`MEAN_EARTH_RADIUS_METERS`].
pub fn haversine_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // rounding can push h a hair past 1 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    MEAN_EARTH_RADIUS_METERS * c
}
