use crate::config::EmbeddingConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads an embedding model by name. Called once per model by the cache.
#[async_trait::async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn load(&self, model: &str) -> Result<Arc<dyn TextEncoder>>;
}

/// A loaded model that turns text into a vector.
#[async_trait::async_trait]
pub trait TextEncoder: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Backend for an embedding server that speaks the `/embeddings` API
/// (text-embeddings-inference, llama.cpp, OpenAI-compatible gateways).
pub struct EmbeddingService {
    client: Client,
    base_url: String,
    dimension: usize,
}

impl EmbeddingService {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build embedding HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimension: config.dimension,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingBackend for EmbeddingService {
    async fn load(&self, model: &str) -> Result<Arc<dyn TextEncoder>> {
        if model.trim().is_empty() {
            anyhow::bail!("Embedding model name is empty");
        }

        info!("Loading embedding model {}", model);

        let encoder = HttpEncoder {
            client: self.client.clone(),
            url: format!("{}/embeddings", self.base_url),
            model: model.to_string(),
            dimension: self.dimension,
        };

        // Warm-up encode so a missing model fails here, once, instead of per request
        encoder.encode("warmup").await.with_context(|| format!("Failed to load model {model}"))?;

        Ok(Arc::new(encoder))
    }
}

struct HttpEncoder {
    client: Client,
    url: String,
    model: String,
    dimension: usize,
}

#[async_trait::async_trait]
impl TextEncoder for HttpEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for {} chars", text.len());

        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to embedding server")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding API error ({}): {}", status, body);
        }

        let json_value: Value = response
            .json()
            .await
            .context("Failed to parse embedding response as JSON")?;

        let embedding = parse_embedding(&json_value)?;

        if embedding.is_empty() {
            anyhow::bail!("Generated embedding is empty");
        }

        if self.dimension != 0 && embedding.len() != self.dimension {
            anyhow::bail!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            );
        }

        Ok(embedding)
    }
}

/// Accepts `{"data": [{"embedding": [..]}]}`, `{"embedding": [..]}`,
/// `[{"embedding": [..]}]`, `[[..]]` and `[..]`.
fn parse_embedding(value: &Value) -> Result<Vec<f32>> {
    let floats = |v: &Value| -> Option<Vec<f32>> {
        v.as_array()
            .map(|arr| arr.iter().filter_map(|x| x.as_f64().map(|f| f as f32)).collect())
    };

    let found = match value {
        Value::Object(obj) => obj
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|first| first.get("embedding"))
            .or_else(|| obj.get("embedding"))
            .and_then(floats),
        Value::Array(arr) => match arr.first() {
            Some(first) if first.is_object() => first.get("embedding").and_then(floats),
            Some(first) if first.is_array() => floats(first),
            Some(_) => floats(value),
            None => None,
        },
        _ => None,
    };

    found.with_context(|| format!("Unrecognized embedding response format: {value}"))
}
