/// Configuration management for Geo Post Service
///
/// Everything is read from environment variables with development defaults.
use db_pool::env_utils::parse_env_or_default;
use db_pool::DbConfig;
use std::time::Duration;

use crate::services::{
    SearchSettings, DEFAULT_QUERY_TIMEOUT, DEFAULT_RADIUS_KM, DEFAULT_SCAN_BATCH_SIZE,
};

/// Service name used for pool metrics and logs
pub const SERVICE_NAME: &str = "geo-post-service";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Storage backend and pool settings
    pub database: DbConfig,
    /// Search coordinator settings
    pub search: SearchConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Search coordinator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub default_radius_km: f64,
    pub query_timeout_ms: u64,
    pub scan_batch_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_km: DEFAULT_RADIUS_KM,
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT.as_millis() as u64,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let config = Self {
            default_radius_km: parse_env_or_default(
                "SEARCH_DEFAULT_RADIUS_KM",
                defaults.default_radius_km,
            )?,
            query_timeout_ms: parse_env_or_default(
                "SEARCH_QUERY_TIMEOUT_MS",
                defaults.query_timeout_ms,
            )?,
            scan_batch_size: parse_env_or_default(
                "SEARCH_SCAN_BATCH_SIZE",
                defaults.scan_batch_size,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.default_radius_km.is_finite() || self.default_radius_km <= 0.0 {
            return Err("SEARCH_DEFAULT_RADIUS_KM must be greater than 0".to_string());
        }
        if self.query_timeout_ms == 0 {
            return Err("SEARCH_QUERY_TIMEOUT_MS must be greater than 0".to_string());
        }
        if self.scan_batch_size == 0 {
            return Err("SEARCH_SCAN_BATCH_SIZE must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            default_radius_km: self.default_radius_km,
            query_timeout: Duration::from_millis(self.query_timeout_ms),
            scan_batch_size: self.scan_batch_size,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: std::env::var("GEO_POST_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("GEO_POST_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DbConfig::from_env(SERVICE_NAME)?,
            search: SearchConfig::from_env()?,
        })
    }
}
