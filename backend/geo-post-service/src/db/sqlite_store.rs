use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{offset_param, PostStore, StoreBackend};
use crate::error::Result;
use crate::geo::naive;
use crate::metrics::search::record_nearby_candidates;
use crate::models::{posts_from_rows, NearbyQuery, Post, PostRow, Window};

const SQLITE_POST_COLUMNS: &str =
    "id, user_id, content, image_url, city, latitude, longitude, metadata, created_at, updated_at";

/// Rows read per round trip while scanning for a text match.
const TEXT_SCAN_BATCH: u32 = 500;

/// Post store on SQLite.
///
/// Radius queries take the naive path: bounding-box candidates from SQL, the
/// rest in process. Text matching is also done in process, since SQLite's
/// `lower()` and `LIKE` only fold ASCII case.
#[derive(Clone)]
pub struct SqlitePostStore {
    pool: SqlitePool,
}

impl SqlitePostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persist an already validated post.
    pub async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, image_url, city, latitude, longitude,
                               metadata, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(&post.city)
        .bind(post.location.map(|p| p.latitude()))
        .bind(post.location.map(|p| p.longitude()))
        .bind(post.metadata.to_column()?)
        .bind(timestamp_text(&post.created_at))
        .bind(timestamp_text(&post.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bounding-box candidates, newest first.
    async fn nearby_candidates(&self, query: &NearbyQuery) -> Result<Vec<Post>> {
        let filter = naive::candidate_filter(query);
        let sql = format!(
            "SELECT {} FROM posts WHERE {} ORDER BY created_at DESC, id ASC",
            SQLITE_POST_COLUMNS, filter.clause
        );

        let mut statement = sqlx::query_as::<_, PostRow>(&sql);
        for value in &filter.binds {
            statement = statement.bind(*value);
        }
        let rows = statement.fetch_all(&self.pool).await?;

        posts_from_rows(rows)
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    async fn list_by_city(&self, city: &str, window: Window) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE city = ? ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
            SQLITE_POST_COLUMNS
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(city)
            .bind(i64::from(window.limit))
            .bind(offset_param(window))
            .fetch_all(&self.pool)
            .await?;

        posts_from_rows(rows)
    }

    async fn find_nearby(&self, query: &NearbyQuery, window: Window) -> Result<Vec<Post>> {
        let candidates = self.nearby_candidates(query).await?;
        let prefiltered = candidates.len();

        let kept = naive::within_radius(candidates, query);
        record_nearby_candidates(self.backend(), prefiltered, kept.len());
        debug!(
            backend = %self.backend(),
            prefiltered,
            kept = kept.len(),
            radius_km = query.radius_km,
            "naive radius filter"
        );

        Ok(window.apply(kept))
    }

    async fn search_by_text(&self, query: &str, window: Window) -> Result<Vec<Post>> {
        let needle = query.to_lowercase();
        let wanted = usize::try_from(window.end()).unwrap_or(usize::MAX);
        let sql = format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
            SQLITE_POST_COLUMNS
        );

        let mut matches = Vec::new();
        let mut offset = 0u64;
        let mut scanned = 0usize;
        loop {
            let rows = sqlx::query_as::<_, PostRow>(&sql)
                .bind(i64::from(TEXT_SCAN_BATCH))
                .bind(offset_param(Window::new(TEXT_SCAN_BATCH, offset)))
                .fetch_all(&self.pool)
                .await?;
            let fetched = rows.len();
            scanned += fetched;
            matches.extend(
                posts_from_rows(rows)?
                    .into_iter()
                    .filter(|post| post.content_contains(&needle)),
            );

            if matches.len() >= wanted || fetched < TEXT_SCAN_BATCH as usize {
                break;
            }
            offset += u64::from(TEXT_SCAN_BATCH);
        }
        debug!(
            backend = %self.backend(),
            scanned,
            matched = matches.len(),
            "in-process text match"
        );

        matches.truncate(wanted);
        Ok(window.apply(matches))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Fixed-width UTC text; lexicographic order equals time order.
fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
