//! Error types for the omnirag service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for omnirag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors, mapped onto HTTP statuses at the endpoint boundary
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid API key
    #[error("Invalid API key")]
    Unauthorized,

    /// The RAG engine handle was not initialized at startup
    #[error("RAG engine not initialized")]
    EngineUnavailable,

    /// Unknown doc_id or unresolved file_name
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The engine failed while ingesting a document
    #[error("Error processing document: {0}")]
    Processing(String),

    /// The engine failed while answering a query
    #[error("Error querying: {0}")]
    QueryFailed(String),

    /// Malformed request (e.g. multipart without a file part)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            Error::EngineUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "engine_unavailable",
                self.to_string(),
            ),
            Error::DocumentNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found", self.to_string())
            }
            Error::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            Error::Processing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "processing_error",
                self.to_string(),
            ),
            Error::QueryFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "query_error",
                self.to_string(),
            ),
            Error::Config(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone())
            }
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "json_error",
                err.to_string(),
            ),
            Error::Http(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "http_error",
                err.to_string(),
            ),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        let cases = [
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::EngineUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                Error::DocumentNotFound("report.pdf".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::Processing("parser crashed".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::QueryFailed("timeout".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::InvalidRequest("no file".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn not_found_message_names_the_document() {
        let err = Error::DocumentNotFound("missing.pdf".into());
        assert_eq!(err.to_string(), "Document not found: missing.pdf");
    }
}
