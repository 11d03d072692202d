use async_trait::async_trait;
use sqlx::PgPool;

use super::{escape_like, offset_param, PostStore, StoreBackend};
use crate::error::Result;
use crate::geo::native::{NearbyBinds, NEARBY_SQL};
use crate::models::{posts_from_rows, NearbyQuery, Post, PostRow, Window};

/// Post store on PostgreSQL with PostGIS.
///
/// Radius filtering, ordering and pagination all run in the database.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Persist an already validated post.
    pub async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, image_url, city, latitude, longitude,
                               metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8::jsonb, $9, $10)
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
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn list_by_city(&self, city: &str, window: Window) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, content, image_url, city, latitude, longitude,
                   metadata::text AS metadata, created_at, updated_at
            FROM posts
            WHERE city = $1
            ORDER BY created_at DESC, id COLLATE "C" ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(city)
        .bind(i64::from(window.limit))
        .bind(offset_param(window))
        .fetch_all(&self.pool)
        .await?;

        posts_from_rows(rows)
    }

    async fn find_nearby(&self, query: &NearbyQuery, window: Window) -> Result<Vec<Post>> {
        let binds = NearbyBinds::new(query, window);
        let rows = sqlx::query_as::<_, PostRow>(NEARBY_SQL)
            .bind(binds.latitude)
            .bind(binds.longitude)
            .bind(binds.radius_km)
            .bind(binds.prefilter_meters)
            .bind(binds.limit)
            .bind(binds.offset)
            .bind(binds.earth_radius_km)
            .fetch_all(&self.pool)
            .await?;

        posts_from_rows(rows)
    }

    async fn search_by_text(&self, query: &str, window: Window) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, content, image_url, city, latitude, longitude,
                   metadata::text AS metadata, created_at, updated_at
            FROM posts
            WHERE content ILIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY created_at DESC, id COLLATE "C" ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(escape_like(query))
        .bind(i64::from(window.limit))
        .bind(offset_param(window))
        .fetch_all(&self.pool)
        .await?;

        posts_from_rows(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
