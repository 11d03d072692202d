//! Environment variable parsing utilities
//!
//! Provides safe, ergonomic functions for parsing environment variables
//! with sensible defaults, reporting malformed values instead of ignoring them.

use std::fmt::Display;
use std::str::FromStr;

/// Parse an environment variable, falling back to `default` only when it is unset
///
/// A value that is present but unparsable is reported instead of ignored.
///
/// # Example
/// ```ignore
/// let radius: f64 = parse_env_or_default("SEARCH_DEFAULT_RADIUS_KM", 10.0)?;
/// ```
pub fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
