/// Geo Post Service Library
///
/// Location-aware post retrieval for the Sonet platform: radius search around a
/// coordinate, exact city listings and substring search, over either SQLite
/// (naive radius filtering) or PostgreSQL/PostGIS (indexed radius filtering)
/// with identical results.
///
/// # Modules
///
/// - `geo`: bounding box, haversine distance and the two radius strategies
/// - `db`: the `PostStore` contract, both backends and schema bootstrap
/// - `models`: posts, coordinates, metadata and search parameters
/// - `services`: the search coordinator
/// - `handlers`: HTTP request handlers
/// - `error`: error types and handling
/// - `config`: configuration management
/// - `metrics`: observability and metrics collection
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
