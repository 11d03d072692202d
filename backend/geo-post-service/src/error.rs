/// Error types for the geo post service
///
/// Every failure of the retrieval core is one of two kinds: the caller sent
/// something unusable (`InvalidParameter`) or the storage layer failed
/// (`StorageUnavailable`). Neither is retried here.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Result type for geo-post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed numeric input, out-of-range coordinate, missing pairing or no criterion
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The backend could not be reached, a query failed or timed out
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored row violates the post invariants (half a coordinate, bad metadata)
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Start-up configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidParameter(msg.into())
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidParameter(_) => "invalid_parameter",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::DataIntegrity(_) => "data_integrity",
            AppError::Config(_) => "config",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DataIntegrity(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DataIntegrity(err.to_string())
    }
}
