//! Integration Tests: HTTP surface
//!
//! Drives the actix routes against a seeded in-memory SQLite store.

mod common;

use actix_web::{test, web, App};
use common::*;
use geo_post_service::handlers;
use geo_post_service::services::{SearchCoordinator, SearchSettings};
use serde_json::Value;
use std::sync::Arc;

async fn coordinator() -> web::Data<SearchCoordinator> {
    let store = seeded_sqlite_store(&fixture_posts()).await;
    web::Data::new(SearchCoordinator::new(
        Arc::new(store),
        SearchSettings::default(),
    ))
}

fn data_labels(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|post| {
            post["content"]
                .as_str()
                .and_then(|c| c.split(':').next())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[actix_web::test]
async fn search_without_criterion_is_bad_request() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/search?page=2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[actix_web::test]
async fn search_by_coordinate_returns_nearest_first_with_meta() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/search?lat=37.7749&lng=-122.4194&radius=600&limit=2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(data_labels(&body), vec!["sf-coffee", "twin"]);
    assert_eq!(body["meta"]["lat"], 37.7749);
    assert_eq!(body["meta"]["lng"], -122.4194);
    assert_eq!(body["meta"]["radius"], 600.0);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 2);
    assert_eq!(body["meta"]["offset"], 0);
    assert_eq!(body["meta"]["count"], 2);
    assert!(body["meta"].get("city").is_none());

    let first = &body["data"][0];
    assert_eq!(first["latitude"], 37.7749);
    assert_eq!(first["city"], "San Francisco");
    assert_eq!(first["metadata"]["tags"][0], "coffee");
}

#[actix_web::test]
async fn search_by_city_with_text_post_filter() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/search?city=San%20Francisco&q=Coffee")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(data_labels(&body), vec!["sf-coffee", "sf-fog"]);
    assert_eq!(body["meta"]["query"], "Coffee");
    assert_eq!(body["meta"]["city"], "San Francisco");
}

#[actix_web::test]
async fn search_with_malformed_numbers_is_bad_request() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    for uri in [
        "/api/v1/posts/search?lat=abc&lng=1",
        "/api/v1/posts/search?lat=37.7",
        "/api/v1/posts/search?lat=37.7&lng=-122.4&radius=0",
        "/api/v1/posts/search?q=coffee&limit=ten",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
    }
}

#[actix_web::test]
async fn city_route_decodes_path_segment() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/city/San%20Francisco?limit=2&page=2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(data_labels(&body), vec!["sf-fog"]);
    assert_eq!(body["meta"]["city"], "San Francisco");
    assert_eq!(body["meta"]["offset"], 2);
}

#[actix_web::test]
async fn city_route_decodes_path_segment_once() {
    let mut posts = fixture_posts();
    posts.push(post("percent-city", "Literal percent in the name", Some("A%41"), None, 70));
    posts.push(post("double-decoded", "Would match a second decode", Some("AA"), None, 75));
    let store = seeded_sqlite_store(&posts).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(SearchCoordinator::new(
                Arc::new(store),
                SearchSettings::default(),
            )))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/city/A%2541")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["meta"]["city"], "A%41");
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(data_labels(&body), vec!["percent-city"]);
}

#[actix_web::test]
async fn nearby_route_requires_coordinate() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/nearby?radius=5")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/nearby?lat=-16.5&lng=179.95&radius=20")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(data_labels(&body), vec!["dateline-east", "dateline-west"]);
    assert_eq!(body["meta"]["radius"], 20.0);
}

#[actix_web::test]
async fn limit_is_clamped_to_maximum() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/search?q=:&limit=1000&page=0")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["meta"]["limit"], 100);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["count"], fixture_posts().len());
}

#[actix_web::test]
async fn health_and_metrics_endpoints() {
    let app = test::init_service(
        App::new()
            .app_data(coordinator().await)
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "geo-post-service");
    assert_eq!(body["database"]["status"], "healthy");
    assert_eq!(body["database"]["backend"], "sqlite");

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}
