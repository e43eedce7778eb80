//! Application state for the API server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::engine::EngineHandle;
use crate::metadata::MetadataStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Document metadata store
    store: MetadataStore,
    /// Engine handle, injected at construction and immutable afterwards.
    /// `None` models the not-yet-initialized window: uploads and queries
    /// answer 503 until a handle exists.
    engine: Option<EngineHandle>,
}

impl AppState {
    /// Create the state, opening the metadata store at the configured path.
    pub fn new(config: RagConfig, engine: Option<EngineHandle>) -> Self {
        let store = MetadataStore::open(&config.storage.metadata_file);
        tracing::info!(
            "Metadata store opened at {} ({} documents)",
            config.storage.metadata_file.display(),
            store.len()
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                engine,
            }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the metadata store.
    pub fn store(&self) -> &MetadataStore {
        &self.inner.store
    }

    /// Get the engine handle, if initialized.
    pub fn engine(&self) -> Option<EngineHandle> {
        self.inner.engine.clone()
    }
}
