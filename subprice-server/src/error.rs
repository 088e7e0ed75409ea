//! Error types for subprice-server
//!
//! Maps the common error taxonomy onto HTTP responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Multipart body could not be read
    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),

    /// IO error while spooling an upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// subprice-common error (validation, ingestion, store)
    #[error(transparent)]
    Common(#[from] subprice_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use subprice_common::Error as E;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Multipart(err) => match err.status() {
                StatusCode::PAYLOAD_TOO_LARGE => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
                status => (status, "BAD_REQUEST"),
            },
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            ApiError::Common(err) => match err {
                E::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                E::Ingestion(_) => (StatusCode::BAD_REQUEST, "INGESTION_ERROR"),
                E::BulkInsert(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INGESTION_ERROR"),
                E::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
                E::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
                E::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!("{} ({})", message, code);
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
