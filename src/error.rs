use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::scorer::ScoreError;

/// Seconds a client should wait before retrying when the catalog is unavailable
const CATALOG_RETRY_AFTER_SECS: &str = "5";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Backing catalog fetch failed and no snapshot has ever been loaded
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("candidate already known")]
    InvalidCandidate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::InvalidCandidate(chord) => AppError::InvalidCandidate(chord.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not found".to_string()),
            AppError::InvalidCandidate(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Upstream detail stays in the log below
            AppError::CatalogUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "catalog unavailable".to_string())
            }
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        }

        let body = Json(json!({
            "error": message
        }));

        if matches!(self, AppError::CatalogUnavailable(_)) {
            return (
                status,
                [(header::RETRY_AFTER, CATALOG_RETRY_AFTER_SECS)],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
