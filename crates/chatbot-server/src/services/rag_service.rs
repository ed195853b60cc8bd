use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Settings;
use crate::services::client_manager::ClientManager;
use crate::services::embedding_cache::EmbeddingCache;
use crate::services::prompt_assembler::PromptAssembler;
use crate::services::sanitizer::sanitize;
use crate::utils::{with_timeout, PipelineError, Stage};

/// Values the pipeline reads per request.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub embedding_model: String,
    pub namespace: String,
    pub retrieval_top_k: usize,
    pub completion_model: String,
    pub vector_timeout: Duration,
    pub completion_timeout: Duration,
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            embedding_model: settings.embedding.model.clone(),
            namespace: settings.vector.namespace.clone(),
            retrieval_top_k: settings.rag.retrieval_top_k,
            completion_model: settings.llm.model.clone(),
            vector_timeout: settings.vector.timeout(),
            completion_timeout: settings.llm.timeout(),
        }
    }
}

/// Embed → retrieve → assemble → complete → sanitize.
///
/// Every stage yields `Result<_, PipelineError>` and the first failure ends
/// the request; nothing is retried.
pub struct RagService {
    embeddings: Arc<EmbeddingCache>,
    clients: Arc<ClientManager>,
    assembler: PromptAssembler,
    config: PipelineConfig,
}

impl RagService {
    pub fn new(
        embeddings: Arc<EmbeddingCache>,
        clients: Arc<ClientManager>,
        assembler: PromptAssembler,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embeddings,
            clients,
            assembler,
            config,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<String, PipelineError> {
        info!("Answering question ({} chars)", question.len());

        // Retrieving
        let vector = self
            .embeddings
            .embed(question, &self.config.embedding_model)
            .await?;

        let index = self.clients.vector_index().await?;
        let matches = with_timeout(Stage::VectorQuery, self.config.vector_timeout, async {
            index
                .query(&vector, self.config.retrieval_top_k, &self.config.namespace)
                .await
                .map_err(PipelineError::retrieval)
        })
        .await?;
        debug!("Retrieved {} matches", matches.len());

        // Generating
        let prompt = self.assembler.assemble(&matches, question);
        let llm = self.clients.completion().await?;
        let messages = prompt.into_messages();
        let raw = with_timeout(Stage::Completion, self.config.completion_timeout, async {
            llm.complete(&messages, &self.config.completion_model)
                .await
                .map_err(PipelineError::generation)
        })
        .await?;

        // Sanitizing
        Ok(sanitize(&raw))
    }
}
