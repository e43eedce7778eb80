//! Query endpoint

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::query::QueryRequest;
use crate::types::response::QueryResponse;

/// Builds the engine-facing query text for a document-scoped question. The
/// mention of the document name is a soft hint to the retrieval engine, not
/// a hard filter.
pub(crate) fn scoped_query(file_name: &str, query: &str) -> String {
    format!("In the document '{}': {}", file_name, query)
}

/// POST /query - Answer a question over the processed documents
pub async fn query_documents(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let engine = state.engine().ok_or(Error::EngineUnavailable)?;

    let query_text = match &request.file_name {
        Some(file_name) => {
            // The name must resolve; on duplicate filenames the first record
            // in upload order is the one checked.
            state
                .store()
                .get_by_name(file_name)
                .ok_or_else(|| Error::DocumentNotFound(file_name.clone()))?;

            tracing::info!("Querying specific document: {}", file_name);
            scoped_query(file_name, &request.query)
        }
        None => {
            tracing::info!("Querying all documents");
            request.query.clone()
        }
    };

    let result = engine
        .query(&query_text, &request.mode, request.vlm_enhanced)
        .await?;

    Ok(Json(QueryResponse {
        query: request.query,
        result,
        file_name: request.file_name,
        mode: request.mode,
        timestamp: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_query_uses_the_fixed_template() {
        assert_eq!(
            scoped_query("report.pdf", "what is the total?"),
            "In the document 'report.pdf': what is the total?"
        );
    }
}
