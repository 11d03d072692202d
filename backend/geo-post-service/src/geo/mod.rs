/// Geo query support
///
/// - `math`: bounding box estimate and haversine distance
/// - `naive`: in-process radius filtering for stores without a spatial index
/// - `native`: the PostGIS query used by the spatially indexed store
pub mod math;
pub mod naive;
pub mod native;

pub use math::{distance_km, estimate_bounding_box, BoundingBox, LongitudeSpan, EARTH_RADIUS_KM};
