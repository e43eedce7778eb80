//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::UploadResponse;

/// POST /upload - Persist a file, hand it to the engine, record metadata
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let engine = state.engine().ok_or(Error::EngineUnavailable)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        // first file part wins; non-file parts are skipped
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Internal(format!("Failed to read file: {}", e)))?;
        let file_size = data.len() as u64;

        let file_path = state.config().storage.upload_dir.join(&file_name);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Overwrites any existing upload with the same name. The file stays
        // on disk even if processing fails below.
        tokio::fs::write(&file_path, &data).await?;

        tracing::info!("Processing file: {} ({} bytes)", file_name, file_size);

        let doc_id = engine
            .ingest(
                &file_path,
                &state.config().storage.output_dir,
                &state.config().engine.parse_method,
                true,
            )
            .await?;

        state.store().add(&doc_id, &file_name, file_size);

        tracing::info!(
            "Document processed successfully: {} (doc_id: {})",
            file_name,
            doc_id
        );

        return Ok(Json(UploadResponse {
            success: true,
            doc_id,
            file_name,
            message: "Document processed successfully".to_string(),
            timestamp: Utc::now(),
        }));
    }

    Err(Error::InvalidRequest(
        "multipart request contained no file".to_string(),
    ))
}
