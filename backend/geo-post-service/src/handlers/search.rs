use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::Result;
use crate::models::{NearbyQuery, Page, Post, SearchParams};
use crate::services::SearchCoordinator;

/// Response envelope for every listing endpoint
#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub data: Vec<Post>,
    pub meta: ResponseMeta,
}

/// Echo of the applied criteria and pagination
#[derive(Debug, Default, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub page: u32,
    pub limit: u32,
    pub offset: u64,
    pub count: usize,
}

impl ResponseMeta {
    fn for_page(page: Page, count: usize) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            offset: page.offset(),
            count,
            ..Self::default()
        }
    }

    fn with_nearby(mut self, near: &NearbyQuery) -> Self {
        self.lat = Some(near.center.latitude());
        self.lng = Some(near.center.longitude());
        self.radius = Some(near.radius_km);
        self
    }
}

/// Search posts by text, city or coordinate
/// GET /api/v1/posts/search?q=&city=&lat=&lng=&radius=&page=&limit=
pub async fn search_posts(
    coordinator: web::Data<SearchCoordinator>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let criteria = query
        .into_inner()
        .into_criteria(coordinator.settings().default_radius_km)?;
    let outcome = coordinator.search(criteria).await?;

    let mut meta = ResponseMeta::for_page(outcome.page(), outcome.posts.len());
    if let Some(near) = outcome.criteria.near.as_ref() {
        meta = meta.with_nearby(near);
    }
    meta.query = outcome.criteria.query;
    meta.city = outcome.criteria.city;

    Ok(HttpResponse::Ok().json(PostsResponse {
        data: outcome.posts,
        meta,
    }))
}

/// List posts in a city (exact, case-sensitive)
/// GET /api/v1/posts/city/{city_name}?page=&limit=
pub async fn posts_by_city(
    coordinator: web::Data<SearchCoordinator>,
    path: web::Path<String>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    // Path extraction has already percent-decoded the segment once.
    let city = path.into_inner();
    let page = query.page()?;

    let posts = coordinator.posts_by_city(&city, page).await?;

    let mut meta = ResponseMeta::for_page(page, posts.len());
    meta.city = Some(city);

    Ok(HttpResponse::Ok().json(PostsResponse { data: posts, meta }))
}

/// List posts near a coordinate, nearest first
/// GET /api/v1/posts/nearby?lat=&lng=&radius=&page=&limit=
pub async fn posts_nearby(
    coordinator: web::Data<SearchCoordinator>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let (near, page) = query
        .into_inner()
        .into_nearby(coordinator.settings().default_radius_km)?;

    let posts = coordinator.posts_nearby(&near, page).await?;
    let meta = ResponseMeta::for_page(page, posts.len()).with_nearby(&near);

    Ok(HttpResponse::Ok().json(PostsResponse { data: posts, meta }))
}
