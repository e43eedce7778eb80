//! Query request types

use serde::{Deserialize, Serialize};

/// Request body for `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Query text to search in documents
    pub query: String,
    /// Optional: scope the query to a specific document by name
    #[serde(default)]
    pub file_name: Option<String>,
    /// Retrieval mode, forwarded verbatim to the engine
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Enable VLM enhancement for image analysis
    #[serde(default = "default_vlm_enhanced")]
    pub vlm_enhanced: bool,
}

fn default_mode() -> String {
    "mix".to_string()
}

fn default_vlm_enhanced() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_omitted() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"query": "what is in the chart?"}"#).unwrap();
        assert_eq!(request.mode, "mix");
        assert!(request.vlm_enhanced);
        assert!(request.file_name.is_none());
    }
}
