//! Spherical-earth geometry: bounding boxes and haversine distance.

use crate::models::GeoPoint;
use std::f64::consts::FRAC_PI_2;

/// Mean earth radius used by every distance computation, in process and in SQL.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Approximate length of one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;
/// Widening applied to the cheap box estimate.
pub const BOX_SAFETY_MARGIN: f64 = 1.2;

/// Below this cosine the longitude span is left unrestricted.
const MIN_COS_LATITUDE: f64 = 1e-9;
/// Slack on the exact spherical half-width so rounding never trims a true match.
const EXACT_WIDTH_SLACK: f64 = 1.000_001;

/// Longitude part of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongitudeSpan {
    /// Any longitude (near a pole or a very large radius).
    Full,
    /// `min <= lng <= max`.
    Between { min: f64, max: f64 },
    /// The span crosses the antimeridian: `lng >= from || lng <= to`.
    Wrapped { from: f64, to: f64 },
}

impl LongitudeSpan {
    pub fn contains(&self, lng: f64) -> bool {
        match *self {
            LongitudeSpan::Full => true,
            LongitudeSpan::Between { min, max } => lng >= min && lng <= max,
            LongitudeSpan::Wrapped { from, to } => lng >= from || lng <= to,
        }
    }
}

/// Superset of the circle of a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub longitude: LongitudeSpan,
}

impl BoundingBox {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.contains_coords(point.latitude(), point.longitude())
    }

    pub fn contains_coords(&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && self.longitude.contains(lng)
    }
}

/// Estimate a box that contains every point within `radius_km` of `(lat, lng)`.
///
/// The latitude band is `radius * 1.2 / 111` degrees each way. The longitude
/// half-width is the larger of the same estimate divided by `cos(lat)` and the
/// exact spherical half-width, so the box stays a superset at high latitudes.
pub fn estimate_bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km * BOX_SAFETY_MARGIN / KM_PER_DEGREE;
    let lat_min = (lat - lat_delta).max(-90.0);
    let lat_max = (lat + lat_delta).min(90.0);

    BoundingBox {
        lat_min,
        lat_max,
        longitude: longitude_span(lat, lng, radius_km, lat_min, lat_max),
    }
}

fn longitude_span(lat: f64, lng: f64, radius_km: f64, lat_min: f64, lat_max: f64) -> LongitudeSpan {
    // A band touching a pole may contain it, and then every meridian crosses the circle.
    if lat_min <= -90.0 || lat_max >= 90.0 {
        return LongitudeSpan::Full;
    }

    let cos_lat = lat.to_radians().cos();
    if cos_lat <= MIN_COS_LATITUDE {
        return LongitudeSpan::Full;
    }

    let angular = radius_km / EARTH_RADIUS_KM;
    if angular >= FRAC_PI_2 {
        return LongitudeSpan::Full;
    }
    let ratio = angular.sin() / cos_lat;
    if ratio >= 1.0 {
        return LongitudeSpan::Full;
    }

    let estimate = radius_km * BOX_SAFETY_MARGIN / (KM_PER_DEGREE * cos_lat);
    let exact = ratio.asin().to_degrees() * EXACT_WIDTH_SLACK;
    let lng_delta = estimate.max(exact);
    if !lng_delta.is_finite() || lng_delta >= 180.0 {
        return LongitudeSpan::Full;
    }

    let min = lng - lng_delta;
    let max = lng + lng_delta;
    if min < -180.0 {
        LongitudeSpan::Wrapped {
            from: min + 360.0,
            to: max,
        }
    } else if max > 180.0 {
        LongitudeSpan::Wrapped {
            from: min,
            to: max - 360.0,
        }
    } else {
        LongitudeSpan::Between { min, max }
    }
}

/// Great-circle distance in kilometers (haversine, sphere of `EARTH_RADIUS_KM`).
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Point reached by travelling `distance_km` from `(lat, lng)` on `bearing_deg`.
    fn destination(lat: f64, lng: f64, bearing_deg: f64, distance_km: f64) -> (f64, f64) {
        let phi1 = lat.to_radians();
        let lambda1 = lng.to_radians();
        let theta = bearing_deg.to_radians();
        let delta = distance_km / EARTH_RADIUS_KM;

        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
        let lng2 = (lambda2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
        (phi2.to_degrees(), lng2)
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(37.7749, -122.4194, 37.7749, -122.4194), 0.0);
    }

    #[test]
    fn san_francisco_to_los_angeles() {
        let d = distance_km(37.7749, -122.4194, 34.0522, -118.2437);
        assert!((d - 559.0).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn nearby_and_far_points_against_ten_km() {
        // ~1.1 km north
        let near = distance_km(37.7749, -122.4194, 37.7849, -122.4194);
        assert!(near > 1.0 && near < 1.2, "got {}", near);
        assert!(near <= 10.0);

        // ~50 km north
        let far = distance_km(37.7749, -122.4194, 38.2246, -122.4194);
        assert!(far > 49.0 && far < 51.0, "got {}", far);
        assert!(far > 10.0);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn box_matches_simple_estimate_at_mid_latitudes() {
        let bbox = estimate_bounding_box(37.7749, -122.4194, 10.0);
        let lat_delta = 10.0 * 1.2 / 111.0;
        assert!((bbox.lat_min - (37.7749 - lat_delta)).abs() < 1e-12);
        assert!((bbox.lat_max - (37.7749 + lat_delta)).abs() < 1e-12);

        let lng_delta = 10.0 * 1.2 / (111.0 * 37.7749_f64.to_radians().cos());
        match bbox.longitude {
            LongitudeSpan::Between { min, max } => {
                assert!((min - (-122.4194 - lng_delta)).abs() < 1e-9);
                assert!((max - (-122.4194 + lng_delta)).abs() < 1e-9);
            }
            other => panic!("unexpected span {:?}", other),
        }
    }

    #[test]
    fn box_near_pole_has_no_longitude_restriction() {
        let bbox = estimate_bounding_box(89.99, 45.0, 5.0);
        assert_eq!(bbox.longitude, LongitudeSpan::Full);
        assert_eq!(bbox.lat_max, 90.0);

        let bbox = estimate_bounding_box(90.0, 0.0, 1.0);
        assert_eq!(bbox.longitude, LongitudeSpan::Full);
        assert!(bbox.contains_coords(89.995, -170.0));
    }

    #[test]
    fn huge_radius_covers_everything() {
        let bbox = estimate_bounding_box(10.0, 20.0, 15_000.0);
        assert_eq!(bbox.lat_min, -90.0);
        assert_eq!(bbox.lat_max, 90.0);
        assert_eq!(bbox.longitude, LongitudeSpan::Full);
    }

    #[test]
    fn box_wraps_across_antimeridian() {
        let bbox = estimate_bounding_box(-17.7, 179.9, 50.0);
        assert!(matches!(bbox.longitude, LongitudeSpan::Wrapped { .. }));
        assert!(bbox.contains_coords(-17.7, -179.8));
        assert!(bbox.contains_coords(-17.7, 179.5));
        assert!(!bbox.contains_coords(-17.7, 0.0));

        let bbox = estimate_bounding_box(65.0, -179.95, 30.0);
        assert!(matches!(bbox.longitude, LongitudeSpan::Wrapped { .. }));
        assert!(bbox.contains_coords(65.0, 179.9));
    }

    #[test]
    fn box_is_a_superset_of_the_circle() {
        let latitudes = [-89.5, -80.0, -60.0, -33.9, 0.0, 12.5, 37.7749, 60.0, 75.0, 85.0, 89.9];
        let longitudes = [-180.0, -179.99, -122.4194, 0.0, 100.0, 179.95, 180.0];
        let radii = [0.5, 10.0, 150.0, 800.0, 2_500.0, 7_000.0];

        for &lat in &latitudes {
            for &lng in &longitudes {
                for &radius in &radii {
                    let bbox = estimate_bounding_box(lat, lng, radius);
                    for step in 0..72 {
                        let bearing = step as f64 * 5.0;
                        // Points on and just inside the boundary.
                        for fraction in [0.5, 0.999_999] {
                            let (plat, plng) = destination(lat, lng, bearing, radius * fraction);
                            let d = distance_km(lat, lng, plat, plng);
                            if d <= radius {
                                assert!(
                                    bbox.contains_coords(plat, plng),
                                    "center=({}, {}) r={} point=({}, {}) bbox={:?}",
                                    lat,
                                    lng,
                                    radius,
                                    plat,
                                    plng,
                                    bbox
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}
