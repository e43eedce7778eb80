//! Injectable model functions for engine construction
//!
//! The engine is built around three functions: text completion, vision
//! completion, and batch embedding. All three speak the OpenAI-compatible
//! chat/embeddings wire format against a configured endpoint.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ModelConfig;
use crate::error::{Error, Result};

/// Per-call token budget declared by the embedding function
pub const MAX_EMBED_TOKENS: usize = 8192;

/// The three model functions handed to the engine at construction time
pub struct ModelSuite {
    pub chat: ChatModel,
    pub vision: VisionModel,
    pub embedding: EmbeddingModel,
}

impl ModelSuite {
    /// Build the suite from configuration, sharing one HTTP client.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let chat = ChatModel {
            client: client.clone(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.completion_model.clone(),
        };

        let vision = VisionModel {
            vision: ChatModel {
                client: client.clone(),
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                model: config.vision_model.clone(),
            },
            fallback: chat.clone(),
        };

        let embedding = EmbeddingModel {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dim,
        };

        Ok(Self {
            chat,
            vision,
            embedding,
        })
    }
}

/// Text completion against an OpenAI-compatible chat endpoint
#[derive(Clone)]
pub struct ChatModel {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatModel {
    /// Run a plain prompt/system completion.
    pub async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));
        self.chat(messages).await
    }

    /// Run a completion over pre-built messages.
    pub async fn chat(&self, messages: Vec<Value>) -> Result<String> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&json!({
                "model": self.model,
                "messages": messages,
            }));

        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .or_else(|| body["message"].as_str())
                .unwrap_or("unknown API error");
            return Err(Error::Internal(format!(
                "Model API error [{}]: {}",
                status.as_u16(),
                message
            )));
        }

        Ok(body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }

    /// Identifier of the underlying model.
    pub fn model_id(&self) -> &str {
        &self.model
    }
}

/// Which path a vision request takes
#[derive(Debug, PartialEq, Eq)]
enum VisionRoute {
    /// Caller supplied a complete message payload
    Messages,
    /// Caller supplied a single image plus prompt
    Image,
    /// Neither supplied: plain text completion on the fallback model
    Fallback,
}

fn route(has_messages: bool, has_image: bool) -> VisionRoute {
    if has_messages {
        VisionRoute::Messages
    } else if has_image {
        VisionRoute::Image
    } else {
        VisionRoute::Fallback
    }
}

/// Builds the user/system messages for a single-image vision request.
fn image_messages(prompt: &str, system: Option<&str>, image_base64: &str) -> Vec<Value> {
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({
        "role": "user",
        "content": [
            {"type": "text", "text": prompt},
            {"type": "image_url", "image_url": {
                "url": format!("data:image/jpeg;base64,{}", image_base64)
            }},
        ],
    }));
    messages
}

/// Vision completion, accepting either a pre-built multi-part message payload
/// or a single image plus prompt; falls back to the text model when neither
/// is supplied.
pub struct VisionModel {
    vision: ChatModel,
    fallback: ChatModel,
}

impl VisionModel {
    pub async fn complete(
        &self,
        prompt: &str,
        system: Option<&str>,
        image_base64: Option<&str>,
        messages: Option<Vec<Value>>,
    ) -> Result<String> {
        match route(messages.is_some(), image_base64.is_some()) {
            VisionRoute::Messages => self.vision.chat(messages.unwrap_or_default()).await,
            VisionRoute::Image => {
                let messages = image_messages(prompt, system, image_base64.unwrap_or_default());
                self.vision.chat(messages).await
            }
            VisionRoute::Fallback => self.fallback.complete(prompt, system).await,
        }
    }

    /// Identifier of the vision model.
    pub fn model_id(&self) -> &str {
        self.vision.model_id()
    }
}

/// Batch text embedding with a declared dimensionality and token budget
pub struct EmbeddingModel {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

impl EmbeddingModel {
    /// Embed a batch of texts, one vector each.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&json!({
                "model": self.model,
                "input": texts,
            }));

        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown API error");
            return Err(Error::Internal(format!(
                "Embedding API error [{}]: {}",
                status.as_u16(),
                message
            )));
        }

        let data = body["data"]
            .as_array()
            .ok_or_else(|| Error::internal("Embedding response missing data array"))?;

        data.iter()
            .map(|entry| {
                entry["embedding"]
                    .as_array()
                    .ok_or_else(|| Error::internal("Embedding response missing vector"))
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(|v| v.as_f64())
                            .map(|v| v as f32)
                            .collect()
                    })
            })
            .collect()
    }

    /// Declared embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Per-call token budget.
    pub fn max_tokens(&self) -> usize {
        MAX_EMBED_TOKENS
    }

    /// Identifier of the embedding model.
    pub fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_routing_prefers_messages_then_image() {
        assert_eq!(route(true, true), VisionRoute::Messages);
        assert_eq!(route(true, false), VisionRoute::Messages);
        assert_eq!(route(false, true), VisionRoute::Image);
        assert_eq!(route(false, false), VisionRoute::Fallback);
    }

    #[test]
    fn image_messages_embed_the_payload_as_data_url() {
        let messages = image_messages("describe the chart", Some("be terse"), "aGVsbG8=");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");

        let parts = messages[1]["content"].as_array().unwrap();
        assert_eq!(parts[0]["text"], "describe the chart");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    #[test]
    fn image_messages_without_system_have_single_entry() {
        let messages = image_messages("what is this?", None, "aGVsbG8=");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }
}
