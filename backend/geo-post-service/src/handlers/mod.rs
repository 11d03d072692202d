/// HTTP handlers for post retrieval
///
/// - Search: text, city and coordinate search through the coordinator
/// - City and nearby listings
/// - Health: storage ping with latency
pub mod health;
pub mod search;

use actix_web::web;

pub use health::health_check;
pub use search::{posts_by_city, posts_nearby, search_posts, PostsResponse, ResponseMeta};

/// Register every route on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("/posts")
                        .route("/search", web::get().to(search_posts))
                        .route("/nearby", web::get().to(posts_nearby))
                        .route("/city/{city_name}", web::get().to(posts_by_city)),
                ),
        );
}
