/// Database access layer
///
/// - `PostStore`: the retrieval contract every backend implements
/// - `SqlitePostStore`: SQLite backend, naive radius search
/// - `PgPostStore`: PostgreSQL/PostGIS backend, indexed radius search
/// - `schema`: idempotent schema bootstrap for both backends
pub mod postgres_store;
pub mod schema;
pub mod sqlite_store;

pub use db_pool::DbBackend as StoreBackend;
pub use postgres_store::PgPostStore;
pub use schema::{ensure_pg_schema, ensure_sqlite_schema};
pub use sqlite_store::SqlitePostStore;

use async_trait::async_trait;
use db_pool::{create_pg_pool, create_sqlite_pool, DbConfig};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::models::{NearbyQuery, Post, Window};

/// Retrieval contract shared by both storage backends.
///
/// Every list is totally ordered so that windows over it are deterministic:
/// `created_at DESC, id ASC`, or nearest first for `find_nearby`.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Backend label for logs and metrics.
    fn backend(&self) -> StoreBackend;

    /// Posts whose city equals `city` exactly, newest first.
    async fn list_by_city(&self, city: &str, window: Window) -> Result<Vec<Post>>;

    /// Posts within the query radius, nearest first.
    async fn find_nearby(&self, query: &NearbyQuery, window: Window) -> Result<Vec<Post>>;

    /// Posts whose content contains `query` (case-insensitive), newest first.
    async fn search_by_text(&self, query: &str, window: Window) -> Result<Vec<Post>>;

    /// Round-trip to the backend.
    async fn ping(&self) -> Result<()>;
}

/// Open the configured backend, make sure its schema exists and wrap it as a `PostStore`.
pub async fn connect_store(config: &DbConfig) -> Result<Arc<dyn PostStore>> {
    config.log_config();

    let store: Arc<dyn PostStore> = match config.backend {
        StoreBackend::Sqlite => {
            let pool = create_sqlite_pool(config).await?;
            ensure_sqlite_schema(&pool).await?;
            Arc::new(SqlitePostStore::new(pool))
        }
        StoreBackend::Postgres => {
            let pool = create_pg_pool(config).await?;
            ensure_pg_schema(&pool).await?;
            Arc::new(PgPostStore::new(pool))
        }
    };

    info!(backend = %store.backend(), "Post store ready");
    Ok(store)
}

/// Escape `\`, `%` and `_` so user input matches literally in `LIKE ... ESCAPE '\'`.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub(crate) fn offset_param(window: Window) -> i64 {
    i64::try_from(window.offset).unwrap_or(i64::MAX)
}
