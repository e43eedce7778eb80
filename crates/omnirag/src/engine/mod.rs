//! External RAG engine contract
//!
//! The engine owns document parsing, multimodal content extraction,
//! knowledge-graph construction, and retrieval ranking. This service only
//! sees the narrow contract below.
//!
//! Implementations:
//! - [`remote::RemoteEngine`]: HTTP bridge to the engine service, executing
//!   the injected model functions on this side of the seam

pub mod models;
pub mod remote;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// Contract consumed by the document lifecycle API
#[async_trait]
pub trait RagEngine: Send + Sync {
    /// Parse and index the file at `file_path`, returning the engine-assigned
    /// document identifier.
    async fn ingest(
        &self,
        file_path: &Path,
        output_dir: &Path,
        parse_method: &str,
        display_stats: bool,
    ) -> Result<String>;

    /// Answer `text` against the index. `mode` is an opaque retrieval-strategy
    /// selector; `vlm_enhanced` requests vision-model analysis of any image
    /// content in the retrieved context.
    async fn query(&self, text: &str, mode: &str, vlm_enhanced: bool) -> Result<String>;
}

/// Shared, immutable-after-init engine handle injected into request handlers
pub type EngineHandle = Arc<dyn RagEngine>;
