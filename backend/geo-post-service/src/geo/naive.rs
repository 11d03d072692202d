//! Radius search for stores without a spatial index.
//!
//! The store fetches the bounding-box candidates (newest first); everything
//! after that happens here: exact distance filter, nearest-first ordering and
//! the pagination window.

use super::math::{estimate_bounding_box, BoundingBox, LongitudeSpan};
use crate::models::{NearbyQuery, Post, Window};

/// SQL predicate selecting bounding-box candidates, with its positional binds.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxFilter {
    pub clause: &'static str,
    pub binds: Vec<f64>,
}

/// Render the candidate predicate for `query` as `?`-style SQL.
pub fn candidate_filter(query: &NearbyQuery) -> BoxFilter {
    let bbox = estimate_bounding_box(
        query.center.latitude(),
        query.center.longitude(),
        query.radius_km,
    );
    box_filter(&bbox)
}

pub fn box_filter(bbox: &BoundingBox) -> BoxFilter {
    let mut binds = vec![bbox.lat_min, bbox.lat_max];
    let clause = match bbox.longitude {
        LongitudeSpan::Full => {
            "latitude IS NOT NULL AND longitude IS NOT NULL \
             AND latitude BETWEEN ? AND ?"
        }
        LongitudeSpan::Between { min, max } => {
            binds.extend([min, max]);
            "latitude IS NOT NULL AND longitude IS NOT NULL \
             AND latitude BETWEEN ? AND ? AND longitude BETWEEN ? AND ?"
        }
        LongitudeSpan::Wrapped { from, to } => {
            binds.extend([from, to]);
            "latitude IS NOT NULL AND longitude IS NOT NULL \
             AND latitude BETWEEN ? AND ? AND (longitude >= ? OR longitude <= ?)"
        }
    };
    BoxFilter { clause, binds }
}

/// Keep candidates within the radius, nearest first.
///
/// The sort is stable, so equal distances keep the candidate order.
pub fn within_radius(candidates: Vec<Post>, query: &NearbyQuery) -> Vec<Post> {
    let mut kept: Vec<(f64, Post)> = candidates
        .into_iter()
        .filter_map(|post| {
            let distance = post.location?.distance_km_to(&query.center);
            (distance <= query.radius_km).then_some((distance, post))
        })
        .collect();

    kept.sort_by(|a, b| a.0.total_cmp(&b.0));
    kept.into_iter().map(|(_, post)| post).collect()
}

/// Exact filter, nearest-first sort, then the window.
pub fn nearby_page(candidates: Vec<Post>, query: &NearbyQuery, window: Window) -> Vec<Post> {
    window.apply(within_radius(candidates, query))
}
