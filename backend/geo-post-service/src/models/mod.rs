/// Data models for geo-post-service
///
/// - Post: the stored post, its raw row form and the insert payload
/// - GeoPoint: a validated WGS84 coordinate
/// - Metadata: schema-less per-post metadata
/// - Search: request parameters, pagination and validated criteria
pub mod location;
pub mod metadata;
pub mod post;
pub mod search;

pub use location::GeoPoint;
pub use metadata::{MetaValue, Metadata};
pub use post::{posts_from_rows, NewPost, Post, PostRow};
pub use search::{
    NearbyQuery, Page, SearchCriteria, SearchParams, Window, DEFAULT_LIMIT, MAX_LIMIT,
};
