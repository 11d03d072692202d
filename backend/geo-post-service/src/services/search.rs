//! Search coordination.
//!
//! One request resolves to exactly one retrieval path, in priority order:
//! coordinate, then city, then text. A text query that accompanies a
//! coordinate or a city is applied in process after the storage predicate and
//! before the pagination window.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::db::{PostStore, StoreBackend};
use crate::error::{AppError, Result};
use crate::metrics::search::record_request;
use crate::models::{NearbyQuery, Page, Post, SearchCriteria, Window};

/// Default radius when a coordinate arrives without one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;
/// Default bound on a single storage call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
/// Default batch size when scanning for text matches.
pub const DEFAULT_SCAN_BATCH_SIZE: u32 = 200;

/// Runtime knobs for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub default_radius_km: f64,
    pub query_timeout: Duration,
    pub scan_batch_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_km: DEFAULT_RADIUS_KM,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

/// Retrieval path chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPath {
    Geo,
    City,
    Text,
}

impl SearchPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPath::Geo => "geo",
            SearchPath::City => "city",
            SearchPath::Text => "text",
        }
    }
}

/// Result of a coordinated search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub posts: Vec<Post>,
    pub path: SearchPath,
    pub criteria: SearchCriteria,
}

impl SearchOutcome {
    pub fn page(&self) -> Page {
        self.criteria.page
    }
}

/// Store health as reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub status: &'static str,
    pub backend: &'static str,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreHealth {
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Storage call selected by the coordinator.
#[derive(Debug, Clone, Copy)]
enum Retrieval<'a> {
    Nearby(&'a NearbyQuery),
    City(&'a str),
    Text(&'a str),
}

impl Retrieval<'_> {
    fn path(&self) -> SearchPath {
        match self {
            Retrieval::Nearby(_) => SearchPath::Geo,
            Retrieval::City(_) => SearchPath::City,
            Retrieval::Text(_) => SearchPath::Text,
        }
    }
}

/// Resolves search criteria against the configured `PostStore`.
#[derive(Clone)]
pub struct SearchCoordinator {
    store: Arc<dyn PostStore>,
    settings: SearchSettings,
}

impl SearchCoordinator {
    pub fn new(store: Arc<dyn PostStore>, settings: SearchSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn backend(&self) -> StoreBackend {
        self.store.backend()
    }

    /// Run the search endpoint: pick the path, post-filter by text where it applies, window.
    pub async fn search(&self, criteria: SearchCriteria) -> Result<SearchOutcome> {
        let retrieval = match (
            criteria.near.as_ref(),
            criteria.city.as_deref(),
            criteria.query.as_deref(),
        ) {
            (Some(near), _, _) => Retrieval::Nearby(near),
            (None, Some(city), _) => Retrieval::City(city),
            (None, None, Some(query)) => Retrieval::Text(query),
            (None, None, None) => {
                record_request("none", "invalid_parameter", 0.0);
                return Err(AppError::invalid(
                    "at least one of q, city or lat/lng is required",
                ));
            }
        };
        let path = retrieval.path();

        // Text is only a post-filter when storage already handled another predicate.
        let post_filter = match retrieval {
            Retrieval::Text(_) => None,
            _ => criteria.query.as_deref(),
        };
        let window = criteria.page.window();

        debug!(
            path = path.as_str(),
            backend = %self.store.backend(),
            post_filter = post_filter.is_some(),
            limit = window.limit,
            offset = window.offset,
            "resolved search path"
        );

        let posts = self
            .observe(path, async {
                match post_filter {
                    Some(needle) => self.scan_filtered(retrieval, needle, window).await,
                    None => self.fetch(retrieval, window).await,
                }
            })
            .await?;

        Ok(SearchOutcome {
            posts,
            path,
            criteria,
        })
    }

    /// Posts in `city` (exact match), newest first.
    pub async fn posts_by_city(&self, city: &str, page: Page) -> Result<Vec<Post>> {
        if city.is_empty() {
            return Err(AppError::invalid("city must not be empty"));
        }
        let retrieval = Retrieval::City(city);
        self.observe(SearchPath::City, self.fetch(retrieval, page.window()))
            .await
    }

    /// Posts within the query radius, nearest first.
    pub async fn posts_nearby(&self, query: &NearbyQuery, page: Page) -> Result<Vec<Post>> {
        let retrieval = Retrieval::Nearby(query);
        self.observe(SearchPath::Geo, self.fetch(retrieval, page.window()))
            .await
    }

    /// Ping the store under the query timeout.
    pub async fn health(&self) -> StoreHealth {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.settings.query_timeout, self.store.ping()).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error("ping")),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        StoreHealth {
            status: if result.is_ok() { "healthy" } else { "unhealthy" },
            backend: self.store.backend().as_str(),
            latency_ms,
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Page through the store from the start, keeping posts whose content
    /// contains `needle`, until `window` can be filled or the store runs dry.
    ///
    /// Each batch is a separate store call. On the naive backend that means the
    /// bounding-box candidates are re-read per batch, so a sparse match in a
    /// dense box grows with `candidates * batches`; `scan_batch_size` bounds it.
    async fn scan_filtered(
        &self,
        retrieval: Retrieval<'_>,
        needle: &str,
        window: Window,
    ) -> Result<Vec<Post>> {
        let needle = needle.to_lowercase();
        let wanted = usize::try_from(window.end()).unwrap_or(usize::MAX);
        let batch_size = self.settings.scan_batch_size.max(1);

        let mut matches = Vec::new();
        let mut offset = 0u64;
        let mut scanned = 0usize;
        loop {
            let batch = self.fetch(retrieval, Window::new(batch_size, offset)).await?;
            let fetched = batch.len();
            scanned += fetched;
            matches.extend(batch.into_iter().filter(|post| post.content_contains(&needle)));

            if matches.len() >= wanted || fetched < batch_size as usize {
                break;
            }
            offset += u64::from(batch_size);
        }

        debug!(
            path = retrieval.path().as_str(),
            scanned,
            matched = matches.len(),
            "text post-filter scan finished"
        );

        matches.truncate(wanted);
        Ok(window.apply(matches))
    }

    /// One storage call, bounded by the query timeout.
    async fn fetch(&self, retrieval: Retrieval<'_>, window: Window) -> Result<Vec<Post>> {
        let call = async {
            match retrieval {
                Retrieval::Nearby(query) => self.store.find_nearby(query, window).await,
                Retrieval::City(city) => self.store.list_by_city(city, window).await,
                Retrieval::Text(query) => self.store.search_by_text(query, window).await,
            }
        };

        let result = match tokio::time::timeout(self.settings.query_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(retrieval.path().as_str())),
        };

        if let Err(err) = &result {
            warn!(
                backend = %self.store.backend(),
                path = retrieval.path().as_str(),
                error = %err,
                "storage call failed"
            );
        }
        result
    }

    async fn observe<F>(&self, path: SearchPath, fut: F) -> Result<Vec<Post>>
    where
        F: Future<Output = Result<Vec<Post>>>,
    {
        let start = Instant::now();
        let result = fut.await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        };
        record_request(path.as_str(), outcome, start.elapsed().as_secs_f64());
        result
    }

    fn timeout_error(&self, operation: &str) -> AppError {
        AppError::StorageUnavailable(format!(
            "{} {} query timed out after {}ms",
            self.store.backend(),
            operation,
            self.settings.query_timeout.as_millis()
        ))
    }
}
