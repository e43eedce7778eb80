//! omnirag: REST API for multimodal document ingestion and querying
//!
//! This crate exposes an HTTP surface for uploading documents, tracking them in
//! a JSON-backed metadata store, and answering natural-language questions over
//! the resulting index. Parsing, knowledge-graph construction, and retrieval
//! ranking are delegated to an external RAG engine reached through the narrow
//! [`engine::RagEngine`] contract; vision-capable models handle images, tables,
//! and equations during ingestion and answer generation.

pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use metadata::{DocumentRecord, MetadataStore};
pub use types::{query::QueryRequest, response::QueryResponse};
