use anyhow::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::Settings;
use crate::services::llm_service::{LlmProvider, LlmService};
use crate::services::vector_service::{RetrievalProvider, VectorIndexClient};
use crate::utils::PipelineError;

type Factory<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

/// Process-lifetime handles to the external services.
///
/// Each handle is built on first use and then shared. Concurrent first
/// accesses wait on the same construction, so exactly one handle per service
/// ever exists. Nothing releases them; they live until shutdown.
pub struct ClientManager {
    vector_factory: Factory<dyn RetrievalProvider>,
    llm_factory: Factory<dyn LlmProvider>,
    vector_index: OnceCell<Arc<dyn RetrievalProvider>>,
    completion: OnceCell<Arc<dyn LlmProvider>>,
}

impl ClientManager {
    pub fn new(vector_factory: Factory<dyn RetrievalProvider>, llm_factory: Factory<dyn LlmProvider>) -> Self {
        Self {
            vector_factory,
            llm_factory,
            vector_index: OnceCell::new(),
            completion: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let vector_config = settings.vector.clone();
        let llm_config = settings.llm.clone();

        Self::new(
            Box::new(move || -> Result<Arc<dyn RetrievalProvider>> {
                info!("Creating vector index client for {}", vector_config.index_host);
                Ok(Arc::new(VectorIndexClient::new(&vector_config)?))
            }),
            Box::new(move || -> Result<Arc<dyn LlmProvider>> {
                info!("Creating completion client for {}", llm_config.base_url);
                Ok(Arc::new(LlmService::new(llm_config.clone())?))
            }),
        )
    }

    pub async fn vector_index(&self) -> Result<Arc<dyn RetrievalProvider>, PipelineError> {
        self.vector_index
            .get_or_try_init(|| async { (self.vector_factory)() })
            .await
            .cloned()
            .map_err(PipelineError::retrieval)
    }

    pub async fn completion(&self) -> Result<Arc<dyn LlmProvider>, PipelineError> {
        self.completion
            .get_or_try_init(|| async { (self.llm_factory)() })
            .await
            .cloned()
            .map_err(PipelineError::generation)
    }
}
