//! Response types for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::DocumentRecord;

/// Response body for `POST /upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub doc_id: String,
    pub file_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Response body for `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The original query text, unprefixed
    pub query: String,
    /// The engine's textual answer
    pub result: String,
    pub file_name: Option<String>,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
}

/// Response body for `GET /documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsListResponse {
    pub total: usize,
    pub documents: Vec<DocumentRecord>,
}

/// Response body for `DELETE /documents/{doc_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub doc_id: String,
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub engine_initialized: bool,
}
