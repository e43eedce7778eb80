//! Configuration for the omnirag service
//!
//! Every knob can be set through the environment (optionally via a `.env`
//! file loaded by the server binary); unset keys fall back to the defaults
//! below.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Model endpoint configuration
    pub models: ModelConfig,
    /// External RAG engine configuration
    pub engine: EngineConfig,
    /// Storage paths
    pub storage: StorageConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            models: ModelConfig::default(),
            engine: EngineConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl RagConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT value: {}", port)))?;
        }
        if let Ok(size) = env::var("MAX_UPLOAD_SIZE") {
            config.server.max_upload_size = size
                .parse()
                .map_err(|_| Error::Config(format!("Invalid MAX_UPLOAD_SIZE value: {}", size)))?;
        }

        if let Ok(key) = env::var("API_KEY") {
            config.auth.api_key = key;
        }

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            config.models.api_key = Some(key);
        }
        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            config.models.base_url = url;
        }
        if let Ok(model) = env::var("LLM_MODEL") {
            config.models.completion_model = model;
        }
        if let Ok(model) = env::var("VISION_MODEL") {
            config.models.vision_model = model;
        }
        if let Ok(model) = env::var("EMBEDDING_MODEL") {
            config.models.embedding_model = model;
        }
        if let Ok(dim) = env::var("EMBEDDING_DIM") {
            config.models.embedding_dim = dim
                .parse()
                .map_err(|_| Error::Config(format!("Invalid EMBEDDING_DIM value: {}", dim)))?;
        }

        if let Ok(url) = env::var("ENGINE_URL") {
            config.engine.base_url = url;
        }
        if let Ok(method) = env::var("PARSE_METHOD") {
            config.engine.parse_method = method;
        }
        if let Ok(secs) = env::var("ENGINE_TIMEOUT_SECS") {
            config.engine.timeout_secs = secs
                .parse()
                .map_err(|_| Error::Config(format!("Invalid ENGINE_TIMEOUT_SECS value: {}", secs)))?;
        }

        if let Ok(dir) = env::var("WORKING_DIR") {
            config.storage.working_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("OUTPUT_DIR") {
            config.storage.output_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("UPLOAD_DIR") {
            config.storage.upload_dir = PathBuf::from(dir);
        }
        if let Ok(file) = env::var("METADATA_FILE") {
            config.storage.metadata_file = PathBuf::from(file);
        }

        Ok(config)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_size: 100 * 1024 * 1024,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret compared against the `x-api-key` header
    pub api_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: "your-secret-api-key".to_string(),
        }
    }
}

/// Model endpoint configuration (OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key for the model endpoint
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Text completion model
    pub completion_model: String,
    /// Vision-capable model for images, tables, and equations
    pub vision_model: String,
    /// Embedding model
    pub embedding_model: String,
    /// Embedding dimensionality
    pub embedding_dim: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            completion_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-large".to_string(),
            embedding_dim: 3072,
        }
    }
}

/// External RAG engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the engine service
    pub base_url: String,
    /// Parse method forwarded with every ingest request
    pub parse_method: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9621".to_string(),
            parse_method: "auto".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Storage paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Engine working directory
    pub working_dir: PathBuf,
    /// Directory for engine-produced artifacts
    pub output_dir: PathBuf,
    /// Directory where raw uploads are persisted by original name
    pub upload_dir: PathBuf,
    /// Path of the JSON metadata snapshot
    pub metadata_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("./rag_storage"),
            output_dir: PathBuf::from("./output"),
            upload_dir: PathBuf::from("./uploads"),
            metadata_file: PathBuf::from("./rag_storage/documents_metadata.json"),
        }
    }
}
