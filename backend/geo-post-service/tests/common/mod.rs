//! Shared fixtures for geo-post-service integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use db_pool::{create_sqlite_pool, DbConfig};
use geo_post_service::db::{ensure_sqlite_schema, SqlitePostStore};
use geo_post_service::models::{GeoPoint, MetaValue, NearbyQuery, NewPost, Post};

pub const SF: (f64, f64) = (37.7749, -122.4194);
pub const MISSION: (f64, f64) = (37.7599, -122.4148);
pub const OAKLAND: (f64, f64) = (37.8044, -122.2712);
pub const LA: (f64, f64) = (34.0522, -118.2437);
pub const DATELINE_EAST: (f64, f64) = (-16.5, 179.95);
pub const DATELINE_WEST: (f64, f64) = (-16.5, -179.95);
pub const ARCTIC_A: (f64, f64) = (89.95, 10.0);
pub const ARCTIC_B: (f64, f64) = (89.95, -170.0);

/// Fresh in-memory SQLite store with the schema in place.
pub async fn sqlite_store() -> SqlitePostStore {
    let config = DbConfig {
        service_name: "geo-post-service-test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        ..DbConfig::default()
    };
    let pool = create_sqlite_pool(&config)
        .await
        .expect("Failed to create SQLite pool");
    ensure_sqlite_schema(&pool)
        .await
        .expect("Failed to create schema");
    SqlitePostStore::new(pool)
}

pub async fn seeded_sqlite_store(posts: &[Post]) -> SqlitePostStore {
    let store = sqlite_store().await;
    for post in posts {
        store.insert_post(post).await.expect("Failed to insert post");
    }
    store
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Post labelled `label` (content is `"<label>: <text>"`), `age_minutes` older than `base_time`.
pub fn post(
    label: &str,
    text: &str,
    city: Option<&str>,
    location: Option<(f64, f64)>,
    age_minutes: i64,
) -> Post {
    let mut new_post = NewPost::new("user-1", format!("{}: {}", label, text));
    if let Some(city) = city {
        new_post = new_post.with_city(city);
    }
    if let Some((lat, lng)) = location {
        new_post = new_post.with_location(lat, lng);
    }
    new_post
        .into_post_at(base_time() - Duration::minutes(age_minutes))
        .expect("valid fixture post")
}

/// Label part of a fixture post's content.
pub fn label(post: &Post) -> &str {
    post.content.split(':').next().unwrap_or_default()
}

pub fn labels(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(label).collect()
}

pub fn nearby(center: (f64, f64), radius_km: f64) -> NearbyQuery {
    NearbyQuery::new(GeoPoint::new(center.0, center.1).unwrap(), radius_km).unwrap()
}

/// Mixed dataset covering cities, text, ties, the antimeridian and a pole.
pub fn fixture_posts() -> Vec<Post> {
    let mut with_meta = post(
        "sf-coffee",
        "Best coffee in town",
        Some("San Francisco"),
        Some(SF),
        0,
    );
    with_meta
        .metadata
        .insert("tags", MetaValue::List(vec![MetaValue::Text("coffee".into())]));

    let twin_a = post("twin", "Same place, same minute", None, Some(SF), 40);
    let mut twin_b = twin_a.clone();
    twin_b.id = uuid::Uuid::new_v4().to_string();

    vec![
        with_meta,
        post("la", "Tacos on the beach", Some("Los Angeles"), Some(LA), 5),
        post("mission", "Late night TACOS", Some("San Francisco"), Some(MISSION), 10),
        post("oakland", "Coffee by the lake", Some("Oakland"), Some(OAKLAND), 20),
        post("sf-fog", "Fog again, coffee needed", Some("San Francisco"), None, 30),
        post("promo", "100% off_peak deals", Some("san francisco"), None, 35),
        twin_a,
        twin_b,
        post("dateline-east", "Sunrise over the dateline", None, Some(DATELINE_EAST), 50),
        post("dateline-west", "Sunset over the dateline", None, Some(DATELINE_WEST), 55),
        post("arctic-a", "Polar night", None, Some(ARCTIC_A), 60),
        post("arctic-b", "Polar bear sighting", None, Some(ARCTIC_B), 65),
    ]
}
