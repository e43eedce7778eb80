//! HTTP server for the document lifecycle API

pub mod auth;
pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::engine::EngineHandle;
use crate::error::{Error, Result};
use state::AppState;

/// Document lifecycle API server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a new server. `engine` is the shared handle injected into every
    /// request; pass `None` to serve in degraded mode (503 on upload/query).
    pub fn new(config: RagConfig, engine: Option<EngineHandle>) -> Self {
        let state = AppState::new(config.clone(), engine);
        Self { config, state }
    }

    /// Start the server.
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state);

        tracing::info!("Starting omnirag server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the full router with middleware layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::api_routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RagEngine;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const API_KEY: &str = "test-key";
    const BOUNDARY: &str = "test-boundary";

    #[derive(Default)]
    struct MockEngine {
        fail_ingest: Option<String>,
        ingested: Mutex<Vec<String>>,
        queries: Mutex<Vec<(String, String, bool)>>,
    }

    #[async_trait]
    impl RagEngine for MockEngine {
        async fn ingest(
            &self,
            file_path: &Path,
            _output_dir: &Path,
            _parse_method: &str,
            _display_stats: bool,
        ) -> crate::Result<String> {
            if let Some(ref message) = self.fail_ingest {
                return Err(crate::Error::Processing(message.clone()));
            }
            self.ingested
                .lock()
                .push(file_path.display().to_string());
            Ok("doc-1".to_string())
        }

        async fn query(
            &self,
            text: &str,
            mode: &str,
            vlm_enhanced: bool,
        ) -> crate::Result<String> {
            self.queries
                .lock()
                .push((text.to_string(), mode.to_string(), vlm_enhanced));
            Ok("the answer".to_string())
        }
    }

    fn test_state(dir: &TempDir, engine: Option<EngineHandle>) -> AppState {
        let mut config = RagConfig::default();
        config.auth.api_key = API_KEY.to_string();
        config.storage.working_dir = dir.path().join("rag_storage");
        config.storage.output_dir = dir.path().join("output");
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.metadata_file = dir.path().join("rag_storage").join("meta.json");
        AppState::new(config, engine)
    }

    fn upload_request(key: &str, file_name: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(auth::API_KEY_HEADER, key)
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, key: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header(auth::API_KEY_HEADER, key)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bare_request(method: &str, uri: &str, key: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(auth::API_KEY_HEADER, key)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_is_open_and_reports_engine_state() {
        let dir = TempDir::new().unwrap();
        let without = build_router(test_state(&dir, None));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&without, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["engine_initialized"], json!(false));

        let dir = TempDir::new().unwrap();
        let with = build_router(test_state(&dir, Some(Arc::new(MockEngine::default()))));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&with, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["engine_initialized"], json!(true));
    }

    #[tokio::test]
    async fn wrong_api_key_is_rejected_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::default());
        let state = test_state(&dir, Some(engine.clone()));
        let router = build_router(state.clone());

        let (status, _) = send(&router, upload_request("wrong-key", "report.pdf", b"data")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // no file written, no metadata mutated, engine never called
        assert!(!dir.path().join("uploads").join("report.pdf").exists());
        assert!(state.store().is_empty());
        assert!(engine.ingested.lock().is_empty());

        let (status, _) = send(
            &router,
            json_request("POST", "/query", "wrong-key", json!({"query": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(engine.queries.lock().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let router = build_router(test_state(&dir, Some(Arc::new(MockEngine::default()))));

        let request = Request::builder()
            .uri("/documents")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn upload_records_metadata_and_lists_the_document() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, Some(Arc::new(MockEngine::default())));
        let router = build_router(state);

        let payload = vec![b'a'; 500];
        let (status, body) = send(&router, upload_request(API_KEY, "report.pdf", &payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["doc_id"], json!("doc-1"));
        assert_eq!(body["file_name"], json!("report.pdf"));

        // the raw file was persisted under its original name
        assert!(dir.path().join("uploads").join("report.pdf").exists());

        let (status, body) = send(&router, bare_request("GET", "/documents", API_KEY)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], json!(1));
        let doc = &body["documents"][0];
        assert_eq!(doc["file_name"], json!("report.pdf"));
        assert_eq!(doc["file_size"], json!(500));
        assert_eq!(doc["status"], json!("processed"));
    }

    #[tokio::test]
    async fn upload_without_engine_returns_503() {
        let dir = TempDir::new().unwrap();
        let router = build_router(test_state(&dir, None));

        let (status, _) = send(&router, upload_request(API_KEY, "report.pdf", b"data")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn failed_ingest_leaves_the_file_but_no_record() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine {
            fail_ingest: Some("parser exploded".to_string()),
            ..Default::default()
        });
        let state = test_state(&dir, Some(engine));
        let router = build_router(state.clone());

        let (status, body) = send(&router, upload_request(API_KEY, "report.pdf", b"data")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("parser exploded"));

        // the upload stays on disk, but no metadata exists
        assert!(dir.path().join("uploads").join("report.pdf").exists());
        assert!(state.store().is_empty());
    }

    #[tokio::test]
    async fn query_with_unknown_file_name_is_404() {
        let dir = TempDir::new().unwrap();
        let router = build_router(test_state(&dir, Some(Arc::new(MockEngine::default()))));

        let request = json_request(
            "POST",
            "/query",
            API_KEY,
            json!({"query": "total?", "file_name": "report.pdf"}),
        );
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("report.pdf"));
    }

    #[tokio::test]
    async fn query_without_file_name_forwards_text_verbatim() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::default());
        let router = build_router(test_state(&dir, Some(engine.clone())));

        let request = json_request(
            "POST",
            "/query",
            API_KEY,
            json!({"query": "what is the total?"}),
        );
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], json!("what is the total?"));
        assert_eq!(body["result"], json!("the answer"));
        assert_eq!(body["mode"], json!("mix"));

        let queries = engine.queries.lock();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], ("what is the total?".to_string(), "mix".to_string(), true));
    }

    #[tokio::test]
    async fn query_scoped_to_a_document_prefixes_the_text() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::default());
        let state = test_state(&dir, Some(engine.clone()));
        state.store().add("doc-1", "report.pdf", 500);
        let router = build_router(state);

        let request = json_request(
            "POST",
            "/query",
            API_KEY,
            json!({"query": "what is the total?", "file_name": "report.pdf", "mode": "hybrid", "vlm_enhanced": false}),
        );
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        // the response echoes the original query, not the prefixed one
        assert_eq!(body["query"], json!("what is the total?"));
        assert_eq!(body["file_name"], json!("report.pdf"));

        let queries = engine.queries.lock();
        assert_eq!(
            queries[0].0,
            "In the document 'report.pdf': what is the total?"
        );
        assert_eq!(queries[0].1, "hybrid");
        assert!(!queries[0].2);
    }

    #[tokio::test]
    async fn query_without_engine_returns_503() {
        let dir = TempDir::new().unwrap();
        let router = build_router(test_state(&dir, None));

        let request = json_request("POST", "/query", API_KEY, json!({"query": "hi"}));
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn delete_succeeds_once_then_404s() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, Some(Arc::new(MockEngine::default())));
        state.store().add("doc-1", "report.pdf", 500);
        let router = build_router(state.clone());

        let (status, body) =
            send(&router, bare_request("DELETE", "/documents/doc-1", API_KEY)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["doc_id"], json!("doc-1"));
        assert!(state.store().is_empty());

        let (status, _) =
            send(&router, bare_request("DELETE", "/documents/doc-1", API_KEY)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
