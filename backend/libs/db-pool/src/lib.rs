//! Database connection pool management
//!
//! Provides pool creation and configuration for both storage backends the
//! post service can run on: PostgreSQL/PostGIS (spatially indexed) and SQLite
//! (no spatial index).

pub mod env_utils;
mod metrics;

use env_utils::parse_env_or_default;
use metrics::update_pool_metrics;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Database, Pool};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default connection string for the SQLite backend (created on first use).
pub const DEFAULT_SQLITE_URL: &str = "sqlite://posts.db?mode=rwc";

/// Default connection string for the PostgreSQL backend.
pub const DEFAULT_POSTGRES_URL: &str = "postgres://localhost/sonet";

/// Storage backend selected at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbBackend {
    /// SQLite: no native spatial index, geo queries run the naive strategy.
    Sqlite,
    /// PostgreSQL with PostGIS: geo queries run on the spatial index.
    Postgres,
}

impl DbBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbBackend::Sqlite => "sqlite",
            DbBackend::Postgres => "postgres",
        }
    }

    fn default_url(&self) -> &'static str {
        match self {
            DbBackend::Sqlite => DEFAULT_SQLITE_URL,
            DbBackend::Postgres => DEFAULT_POSTGRES_URL,
        }
    }
}

impl fmt::Display for DbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DbBackend::Sqlite),
            "postgres" | "postgresql" => Ok(DbBackend::Postgres),
            other => Err(format!(
                "unsupported DB_ADAPTER '{}': expected 'sqlite' or 'postgres'",
                other
            )),
        }
    }
}

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// Which storage backend the URL points at
    pub backend: DbBackend,
    /// Connection URL
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection creation timeout
    pub connect_timeout_secs: u64,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("backend", &self.backend)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            backend: DbBackend::Sqlite,
            database_url: DEFAULT_SQLITE_URL.to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Create a new DbConfig from environment variables
    ///
    /// `DB_ADAPTER` picks the backend (default `sqlite`). An unknown adapter or
    /// an unparsable `DB_*` pool setting is an error, not a silent fallback.
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let backend = match std::env::var("DB_ADAPTER") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse::<DbBackend>()?,
            _ => DbBackend::Sqlite,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| backend.default_url().to_string());

        let defaults = Self::default();
        Ok(Self {
            service_name: service_name.to_string(),
            backend,
            database_url,
            max_connections: parse_env_or_default("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_env_or_default("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: parse_env_or_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            acquire_timeout_secs: parse_env_or_default(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            idle_timeout_secs: parse_env_or_default(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            )?,
            max_lifetime_secs: parse_env_or_default(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            )?,
        })
    }

    /// True when the URL names a private in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.backend == DbBackend::Sqlite && self.database_url.contains(":memory:")
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            "Database Pool Configuration: backend={}, \
             max_connections={}, min_connections={}, \
             connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
            self.backend,
            self.max_connections,
            self.min_connections,
            self.connect_timeout_secs,
            self.acquire_timeout_secs,
            self.idle_timeout_secs,
            self.max_lifetime_secs
        );
    }
}

/// Create a PostgreSQL connection pool with automatic metrics monitoring
pub async fn create_pg_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating PostgreSQL pool: service={}, max={}, min={}, acquire_timeout={}s",
        config.service_name,
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;

    let check = sqlx::query("SELECT 1").execute(&pool);
    verify_connection(config, check).await?;
    spawn_metrics_refresher(pool.clone(), config.service_name.clone());

    Ok(pool)
}

/// Create a SQLite connection pool with automatic metrics monitoring
///
/// An in-memory database exists once per connection, so such URLs get a
/// single connection that is never recycled.
pub async fn create_sqlite_pool(config: &DbConfig) -> Result<SqlitePool, sqlx::Error> {
    debug!(
        "Creating SQLite pool: service={}, max={}, in_memory={}",
        config.service_name,
        config.max_connections,
        config.is_in_memory()
    );

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    let mut options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true);

    options = if config.is_in_memory() {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
    };

    let pool = options.connect_with(connect_options).await?;

    let check = sqlx::query("SELECT 1").execute(&pool);
    verify_connection(config, check).await?;
    spawn_metrics_refresher(pool.clone(), config.service_name.clone());

    Ok(pool)
}

/// Run the post-connect check under the connect timeout.
async fn verify_connection<T, F>(config: &DbConfig, check: F) -> Result<(), sqlx::Error>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(Duration::from_secs(config.connect_timeout_secs), check).await {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                backend = %config.backend,
                "Database pool created and verified successfully"
            );
            Ok(())
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                backend = %config.backend,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                backend = %config.backend,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

fn spawn_metrics_refresher<DB: Database>(pool: Pool<DB>, service: String) {
    update_pool_metrics(&pool, &service);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            if pool.is_closed() {
                break;
            }
            update_pool_metrics(&pool, &service);
        }
    });
}
