//! Document listing and deletion endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::{DeleteResponse, DocumentsListResponse};

/// GET /documents - List all processed documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentsListResponse>> {
    let documents = state.store().list_all();

    Ok(Json(DocumentsListResponse {
        total: documents.len(),
        documents,
    }))
}

/// DELETE /documents/:doc_id - Remove a document's metadata record
///
/// Metadata-only tombstone: the engine is never asked to purge derived index
/// data, so downstream artifacts outlive the record.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.store().delete(&doc_id) {
        return Err(Error::DocumentNotFound(doc_id));
    }

    tracing::info!("Document deleted from metadata: {}", doc_id);

    Ok(Json(DeleteResponse {
        success: true,
        message: "Document removed from metadata (engine index data persists)".to_string(),
        doc_id,
    }))
}
