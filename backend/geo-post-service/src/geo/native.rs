//! Radius search pushed down to PostGIS.
//!
//! `ST_DWithin` on the geography index narrows the rows; membership and
//! ordering use the same haversine expression as `math::distance_km`, so the
//! result matches the naive path row for row.

use super::math::EARTH_RADIUS_KM;
use crate::models::{NearbyQuery, Window};

/// Widening of the index prefilter radius. PostGIS measures on a slightly
/// larger sphere, so the prefilter must never be tighter than the final test.
pub const PREFILTER_MARGIN: f64 = 1.001;

/// Binds: $1 lat, $2 lng, $3 radius km, $4 prefilter meters, $5 limit, $6 offset, $7 earth radius km.
pub const NEARBY_SQL: &str = r#"
    SELECT id, user_id, content, image_url, city, latitude, longitude,
           metadata, created_at, updated_at
    FROM (
        SELECT p.id, p.user_id, p.content, p.image_url, p.city, p.latitude, p.longitude,
               p.metadata::text AS metadata, p.created_at, p.updated_at,
               $7 * 2 * atan2(sqrt(h.a), sqrt(1 - h.a)) AS distance_km
        FROM posts p
        CROSS JOIN LATERAL (
            SELECT LEAST(GREATEST(
                power(sin(radians(p.latitude - $1) / 2), 2)
                + cos(radians($1)) * cos(radians(p.latitude))
                  * power(sin(radians(p.longitude - $2) / 2), 2),
                0), 1) AS a
        ) h
        WHERE p.latitude IS NOT NULL
          AND p.longitude IS NOT NULL
          AND ST_DWithin(
                ST_SetSRID(ST_MakePoint(p.longitude, p.latitude), 4326)::geography,
                ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography,
                $4,
                false
          )
    ) nearby
    WHERE distance_km <= $3
    ORDER BY distance_km ASC, created_at DESC, id COLLATE "C" ASC
    LIMIT $5 OFFSET $6
"#;

/// Bind values for `NEARBY_SQL`, in placeholder order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyBinds {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub prefilter_meters: f64,
    pub limit: i64,
    pub offset: i64,
    pub earth_radius_km: f64,
}

impl NearbyBinds {
    pub fn new(query: &NearbyQuery, window: Window) -> Self {
        Self {
            latitude: query.center.latitude(),
            longitude: query.center.longitude(),
            radius_km: query.radius_km,
            prefilter_meters: prefilter_radius_meters(query.radius_km),
            limit: i64::from(window.limit),
            offset: i64::try_from(window.offset).unwrap_or(i64::MAX),
            earth_radius_km: EARTH_RADIUS_KM,
        }
    }
}

pub fn prefilter_radius_meters(radius_km: f64) -> f64 {
    radius_km * 1000.0 * PREFILTER_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    #[test]
    fn prefilter_is_wider_than_radius() {
        assert!((prefilter_radius_meters(10.0) - 10_010.0).abs() < 1e-9);
        // PostGIS sphere radius is 6371008.8 m
        assert!(PREFILTER_MARGIN > 6_371_008.8 / 6_371_000.0);
    }

    #[test]
    fn binds_follow_query_and_window() {
        let query = NearbyQuery::new(GeoPoint::new(37.7749, -122.4194).unwrap(), 600.0).unwrap();
        let binds = NearbyBinds::new(&query, Window::new(20, 40));

        assert_eq!(binds.latitude, 37.7749);
        assert_eq!(binds.longitude, -122.4194);
        assert_eq!(binds.radius_km, 600.0);
        assert_eq!(binds.limit, 20);
        assert_eq!(binds.offset, 40);
        assert_eq!(binds.earth_radius_km, EARTH_RADIUS_KM);
    }

    #[test]
    fn order_has_a_total_tie_break() {
        assert!(NEARBY_SQL.contains(r#"ORDER BY distance_km ASC, created_at DESC, id COLLATE "C" ASC"#));
    }
}
