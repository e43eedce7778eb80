//! HTTP bridge to the external RAG engine service
//!
//! The engine service owns parsing, graph construction, and retrieval
//! ranking. The injected model functions run on this side of the seam: chunk
//! embeddings are computed here during ingest, and answers are generated here
//! from the retrieved context, through the vision model when image content is
//! present and VLM enhancement is requested.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::engine::models::ModelSuite;
use crate::engine::RagEngine;

const ANSWER_SYSTEM_PROMPT: &str = "You are a document question-answering assistant. \
Answer using only the provided context. If the context does not contain the answer, say so.";

/// HTTP-backed implementation of [`RagEngine`]
pub struct RemoteEngine {
    client: Client,
    base_url: String,
    models: ModelSuite,
}

#[derive(Debug, Deserialize)]
struct IngestReply {
    doc_id: String,
    #[serde(default)]
    chunks: Vec<ChunkText>,
}

#[derive(Debug, Deserialize)]
struct ChunkText {
    id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RetrieveReply {
    #[serde(default)]
    context: String,
    /// Base64 image payloads attached to the retrieved context
    #[serde(default)]
    images: Vec<String>,
}

impl RemoteEngine {
    /// Create a new engine bridge.
    pub fn new(config: &EngineConfig, models: ModelSuite) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            models,
        })
    }

    /// Probe the engine service.
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Split `texts` into batches whose combined approximate token count stays
/// within `budget`. A single oversized text still gets its own batch.
fn batch_by_token_budget(texts: &[String], budget: usize) -> Vec<Vec<String>> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut current_tokens = 0usize;

    for text in texts {
        let tokens = approx_tokens(text);
        if !current.is_empty() && current_tokens + tokens > budget {
            batches.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current_tokens += tokens;
        current.push(text.clone());
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Rough token estimate, good enough for budgeting embedding calls.
fn approx_tokens(text: &str) -> usize {
    text.len() / 4 + 1
}

/// User+system messages carrying every retrieved image payload.
fn multi_image_messages(prompt: &str, images: &[String]) -> Vec<serde_json::Value> {
    let mut content = vec![json!({"type": "text", "text": prompt})];
    for image in images {
        content.push(json!({"type": "image_url", "image_url": {
            "url": format!("data:image/jpeg;base64,{}", image)
        }}));
    }
    vec![
        json!({"role": "system", "content": ANSWER_SYSTEM_PROMPT}),
        json!({"role": "user", "content": content}),
    ]
}

#[async_trait]
impl RagEngine for RemoteEngine {
    async fn ingest(
        &self,
        file_path: &Path,
        output_dir: &Path,
        parse_method: &str,
        display_stats: bool,
    ) -> Result<String> {
        let data = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new()
            .part("file", Part::bytes(data).file_name(file_name.clone()))
            .text("parse_method", parse_method.to_string())
            .text("output_dir", output_dir.display().to_string())
            .text("display_stats", display_stats.to_string());

        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Processing(format!(
                "engine rejected '{}': {} - {}",
                file_name, status, body
            )));
        }

        let reply: IngestReply = response
            .json()
            .await
            .map_err(|e| Error::Processing(format!("invalid engine ingest reply: {}", e)))?;

        tracing::info!(
            "Engine parsed '{}' into {} chunks (doc_id: {})",
            file_name,
            reply.chunks.len(),
            reply.doc_id
        );

        // Embed the extracted chunks here and hand the vectors back, staying
        // within the embedding function's per-call token budget.
        if !reply.chunks.is_empty() {
            let ids: Vec<&str> = reply.chunks.iter().map(|c| c.id.as_str()).collect();
            let texts: Vec<String> = reply.chunks.iter().map(|c| c.text.clone()).collect();

            let mut vectors = Vec::with_capacity(texts.len());
            for batch in batch_by_token_budget(&texts, self.models.embedding.max_tokens()) {
                vectors.extend(self.models.embedding.embed(&batch).await?);
            }

            let payload: Vec<_> = ids
                .iter()
                .zip(vectors)
                .map(|(id, embedding)| json!({"id": id, "embedding": embedding}))
                .collect();

            let response = self
                .client
                .post(format!("{}/documents/{}/vectors", self.base_url, reply.doc_id))
                .json(&json!({
                    "model": self.models.embedding.model_id(),
                    "dimensions": self.models.embedding.dimensions(),
                    "vectors": payload,
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Processing(format!(
                    "engine rejected vectors for '{}': {} - {}",
                    reply.doc_id, status, body
                )));
            }
        }

        Ok(reply.doc_id)
    }

    async fn query(&self, text: &str, mode: &str, vlm_enhanced: bool) -> Result<String> {
        let query_vector = self
            .models
            .embedding
            .embed(std::slice::from_ref(&text.to_string()))
            .await
            .map_err(|e| Error::QueryFailed(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::QueryFailed("empty query embedding".to_string()))?;

        let response = self
            .client
            .post(format!("{}/retrieve", self.base_url))
            .json(&json!({
                "query": text,
                "mode": mode,
                "embedding": query_vector,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::QueryFailed(format!(
                "engine retrieval failed: {} - {}",
                status, body
            )));
        }

        let retrieved: RetrieveReply = response
            .json()
            .await
            .map_err(|e| Error::QueryFailed(format!("invalid engine retrieve reply: {}", e)))?;

        let prompt = format!(
            "Context:\n{}\n\nQuestion: {}",
            retrieved.context, text
        );

        if vlm_enhanced && !retrieved.images.is_empty() {
            tracing::debug!(
                "Answering with the vision model ({} image payloads)",
                retrieved.images.len()
            );
            // One image rides the simple path; several need a pre-built
            // multi-part message payload.
            let (image, messages) = if retrieved.images.len() == 1 {
                (Some(retrieved.images[0].as_str()), None)
            } else {
                (None, Some(multi_image_messages(&prompt, &retrieved.images)))
            };
            self.models
                .vision
                .complete(&prompt, Some(ANSWER_SYSTEM_PROMPT), image, messages)
                .await
                .map_err(|e| Error::QueryFailed(e.to_string()))
        } else {
            self.models
                .chat
                .complete(&prompt, Some(ANSWER_SYSTEM_PROMPT))
                .await
                .map_err(|e| Error::QueryFailed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batching_respects_the_token_budget() {
        // ~26 tokens each against a budget of 60 -> two per batch
        let texts: Vec<String> = (0..5).map(|_| "x".repeat(100)).collect();
        let batches = batch_by_token_budget(&texts, 60);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[2].len(), 1);
        assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), 5);
    }

    #[test]
    fn oversized_text_gets_its_own_batch() {
        let texts = vec!["y".repeat(1000), "short".to_string()];
        let batches = batch_by_token_budget(&texts, 50);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(batch_by_token_budget(&[], 100).is_empty());
    }

    #[test]
    fn multi_image_messages_carry_all_payloads() {
        let images = vec!["aW1nMQ==".to_string(), "aW1nMg==".to_string()];
        let messages = multi_image_messages("what changed between figures?", &images);

        assert_eq!(messages.len(), 2);
        let parts = messages[1]["content"].as_array().unwrap();
        // one text part plus one part per image
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[2]["image_url"]["url"],
            "data:image/jpeg;base64,aW1nMg=="
        );
    }
}
