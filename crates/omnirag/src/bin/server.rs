//! Omnirag API server binary
//!
//! Run with: cargo run -p omnirag --bin omnirag-server

use std::sync::Arc;

use omnirag::config::RagConfig;
use omnirag::engine::{models::ModelSuite, remote::RemoteEngine, EngineHandle};
use omnirag::server::RagServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omnirag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = RagConfig::from_env()?;

    if config.models.api_key.is_none() {
        anyhow::bail!("OPENAI_API_KEY is not set; the model backend requires it");
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Completion model: {}", config.models.completion_model);
    tracing::info!("  - Vision model: {}", config.models.vision_model);
    tracing::info!("  - Embedding model: {}", config.models.embedding_model);
    tracing::info!("  - Embedding dimensions: {}", config.models.embedding_dim);
    tracing::info!("  - Parse method: {}", config.engine.parse_method);

    // The storage directories must exist before the first upload lands
    std::fs::create_dir_all(&config.storage.working_dir)?;
    std::fs::create_dir_all(&config.storage.output_dir)?;
    std::fs::create_dir_all(&config.storage.upload_dir)?;

    // Wire the model suite into the engine bridge
    let models = ModelSuite::from_config(&config.models)?;
    let engine = RemoteEngine::new(&config.engine, models)?;

    tracing::info!("Checking RAG engine at {}...", config.engine.base_url);
    if engine.health_check().await {
        tracing::info!("RAG engine is reachable");
    } else {
        tracing::warn!("RAG engine not reachable at {}", config.engine.base_url);
        tracing::warn!("Upload and query requests will fail until it comes up");
    }

    let handle: EngineHandle = Arc::new(engine);
    let server = RagServer::new(config, Some(handle));

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST   /upload             - Upload a document");
    println!("  POST   /query              - Ask questions");
    println!("  GET    /documents          - List documents");
    println!("  DELETE /documents/:doc_id  - Remove a document");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
