//! Error types
//!
//! None of these reach the engine's callers: store failures are logged and
//! absorbed, config problems are coerced. They surface only at the edges
//! (loading a config file, the HTTP layer, the store port itself).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of a [`ProgressStore`](crate::core::store::ProgressStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key holds something that is not a finite number.
    #[error("corrupt value under {key}")]
    Corrupt { key: String },

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures while reading field-data configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors of the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not a host event.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
