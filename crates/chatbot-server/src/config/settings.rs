use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub vector: VectorConfig,
    pub llm: LlmConfig,
    pub rag: RagConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    /// Upper bound on a single message insert.
    pub write_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    /// Expected vector length; 0 disables the check.
    pub dimension: usize,
    pub cache_capacity: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VectorConfig {
    /// Data-plane host of the index, e.g. `https://codebase-rag-xxxx.svc.pinecone.io`
    pub index_host: String,
    pub api_key: String,
    pub namespace: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RagConfig {
    /// How many neighbours to request from the vector index.
    pub retrieval_top_k: usize,
    /// How many of the returned snippets may enter the prompt.
    pub max_context_matches: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PromptsConfig {
    /// Overrides the built-in assistant policy when set.
    pub system_prompt: Option<String>,
}

impl DatabaseConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl VectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "postgres://localhost/chatbot")?
            .set_default("database.pool_max_size", 10)?
            .set_default("database.pool_timeout_seconds", 3)?
            .set_default("database.write_timeout_seconds", 5)?
            .set_default("embedding.base_url", "http://localhost:8080")?
            .set_default("embedding.model", "sentence-transformers/all-mpnet-base-v2")?
            .set_default("embedding.dimension", 768)?
            .set_default("embedding.cache_capacity", 128)?
            .set_default("embedding.timeout_seconds", 30)?
            .set_default("vector.index_host", "")?
            .set_default("vector.api_key", "")?
            .set_default("vector.namespace", "")?
            .set_default("vector.timeout_seconds", 15)?
            .set_default("llm.base_url", "https://openrouter.ai/api/v1")?
            .set_default("llm.api_key", "")?
            .set_default("llm.model", "deepseek/deepseek-r1:free")?
            .set_default("llm.timeout_seconds", 60)?
            .set_default("rag.retrieval_top_k", 3)?
            .set_default("rag.max_context_matches", 10)?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Variable names used by existing deployments
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("vector.api_key", std::env::var("PINECONE_API_KEY").ok())?
            .set_override_option("vector.namespace", std::env::var("GITHUB_REPO_URL").ok())?
            .set_override_option("llm.api_key", std::env::var("OPENROUTER_API_KEY").ok())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
