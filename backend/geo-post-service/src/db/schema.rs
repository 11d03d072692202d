use sqlx::{PgPool, SqlitePool};
use tracing::info;

use crate::error::Result;

/// Ensure the SQLite `posts` table and its indexes exist.
///
/// SQLite has no spatial index; the composite `(latitude, longitude)` index
/// serves the bounding-box prefilter.
pub async fn ensure_sqlite_schema(pool: &SqlitePool) -> Result<()> {
    info!("Ensuring SQLite posts schema exists");

    for statement in [
        SQLITE_POSTS_TABLE,
        SQLITE_CITY_INDEX,
        SQLITE_CREATED_AT_INDEX,
        SQLITE_LOCATION_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Ensure PostGIS, the `posts` table and its geography index exist.
pub async fn ensure_pg_schema(pool: &PgPool) -> Result<()> {
    info!("Ensuring PostgreSQL posts schema exists");

    for statement in [
        PG_POSTGIS_EXTENSION,
        PG_POSTS_TABLE,
        PG_CITY_INDEX,
        PG_CREATED_AT_INDEX,
        PG_LOCATION_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

// created_at is fixed-width RFC 3339 text so lexicographic order is time order.
const SQLITE_POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    content TEXT NOT NULL,
    image_url TEXT,
    city TEXT,
    latitude REAL,
    longitude REAL,
    metadata TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK ((latitude IS NULL) = (longitude IS NULL)),
    CHECK (latitude IS NULL OR (latitude BETWEEN -90 AND 90)),
    CHECK (longitude IS NULL OR (longitude BETWEEN -180 AND 180))
)
"#;

const SQLITE_CITY_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_posts_city ON posts (city)";

const SQLITE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC)";

const SQLITE_LOCATION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_location ON posts (latitude, longitude)";

const PG_POSTGIS_EXTENSION: &str = "CREATE EXTENSION IF NOT EXISTS postgis";

const PG_POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    content TEXT NOT NULL,
    image_url TEXT,
    city TEXT,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    metadata JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT posts_location_pair CHECK ((latitude IS NULL) = (longitude IS NULL)),
    CONSTRAINT posts_latitude_range CHECK (latitude IS NULL OR latitude BETWEEN -90 AND 90),
    CONSTRAINT posts_longitude_range CHECK (longitude IS NULL OR longitude BETWEEN -180 AND 180)
)
"#;

const PG_CITY_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_posts_city ON posts (city)";

const PG_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC)";

const PG_LOCATION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_posts_location ON posts
USING GIST ((ST_SetSRID(ST_MakePoint(longitude, latitude), 4326)::geography))
"#;
