use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::VectorConfig;

/// Trait for the vector similarity service
#[async_trait::async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// At most `top_k` matches from `namespace`, best first.
    async fn query(&self, vector: &[f32], top_k: usize, namespace: &str) -> Result<Vec<RetrievalMatch>>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: MatchMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RetrievalMatch>,
}

/// Client for a Pinecone-compatible index data plane.
pub struct VectorIndexClient {
    client: Client,
    index_host: String,
    api_key: String,
}

impl VectorIndexClient {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build vector index HTTP client")?;

        Ok(Self {
            client,
            index_host: config.index_host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl RetrievalProvider for VectorIndexClient {
    async fn query(&self, vector: &[f32], top_k: usize, namespace: &str) -> Result<Vec<RetrievalMatch>> {
        debug!("Querying index: top_k={}, namespace={:?}", top_k, namespace);

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            namespace,
        };

        let response = self
            .client
            .post(format!("{}/query", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to vector index")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Vector index error ({}): {}", status, body);
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .context("Failed to parse vector index response")?;

        let mut matches = parsed.matches;
        // Stable, so equal scores keep the index's order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);

        debug!("Index returned {} matches", matches.len());
        Ok(matches)
    }
}
