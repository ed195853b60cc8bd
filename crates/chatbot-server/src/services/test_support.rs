//! In-process stand-ins for the external services.

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::models::chat::ChatMessage;
use crate::services::client_manager::ClientManager;
use crate::services::embedding_cache::EmbeddingCache;
use crate::services::embedding_service::{EmbeddingBackend, TextEncoder};
use crate::services::llm_service::LlmProvider;
use crate::services::prompt_assembler::PromptAssembler;
use crate::services::rag_service::{PipelineConfig, RagService};
use crate::services::vector_service::{MatchMetadata, RetrievalMatch, RetrievalProvider};

#[derive(Default)]
pub struct FakeEmbeddings {
    pub fail: bool,
}

struct FakeEncoder;

#[async_trait::async_trait]
impl TextEncoder for FakeEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0])
    }
}

#[async_trait::async_trait]
impl EmbeddingBackend for FakeEmbeddings {
    async fn load(&self, model: &str) -> Result<Arc<dyn TextEncoder>> {
        if self.fail {
            anyhow::bail!("cannot load {model}");
        }
        Ok(Arc::new(FakeEncoder))
    }
}

#[derive(Default)]
pub struct FakeIndex {
    pub matches: Vec<RetrievalMatch>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub queries: Mutex<Vec<(usize, String)>>,
}

#[async_trait::async_trait]
impl RetrievalProvider for FakeIndex {
    async fn query(&self, _vector: &[f32], top_k: usize, namespace: &str) -> Result<Vec<RetrievalMatch>> {
        self.queries.lock().push((top_k, namespace.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            anyhow::bail!("index unreachable");
        }
        Ok(self.matches.clone())
    }
}

#[derive(Default)]
pub struct FakeLlm {
    pub reply: String,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub prompts: Mutex<Vec<(Vec<ChatMessage>, String)>>,
}

#[async_trait::async_trait]
impl LlmProvider for FakeLlm {
    async fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        self.prompts.lock().push((messages.to_vec(), model.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            anyhow::bail!("No choices returned from completion API");
        }
        Ok(self.reply.clone())
    }
}

pub fn matches(texts: &[&str]) -> Vec<RetrievalMatch> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| RetrievalMatch {
            id: format!("chunk-{i}"),
            score: 0.9 - i as f32 * 0.05,
            metadata: MatchMetadata {
                text: text.to_string(),
                extra: Default::default(),
            },
        })
        .collect()
}

pub fn config() -> PipelineConfig {
    PipelineConfig {
        embedding_model: "sentence-transformers/all-mpnet-base-v2".to_string(),
        namespace: "https://github.com/acme/chat-app".to_string(),
        retrieval_top_k: 3,
        completion_model: "deepseek/deepseek-r1:free".to_string(),
        vector_timeout: Duration::from_millis(200),
        completion_timeout: Duration::from_millis(200),
    }
}

pub struct Harness {
    pub index: Arc<FakeIndex>,
    pub llm: Arc<FakeLlm>,
    pub service: RagService,
}

pub fn harness(embeddings: FakeEmbeddings, index: FakeIndex, llm: FakeLlm) -> Harness {
    let index = Arc::new(index);
    let llm = Arc::new(llm);

    let index_handle = index.clone();
    let llm_handle = llm.clone();
    let clients = ClientManager::new(
        Box::new(move || -> Result<Arc<dyn RetrievalProvider>> { Ok(index_handle.clone()) }),
        Box::new(move || -> Result<Arc<dyn LlmProvider>> { Ok(llm_handle.clone()) }),
    );

    let cache = EmbeddingCache::new(Arc::new(embeddings), 128, Duration::from_secs(1));

    let service = RagService::new(
        Arc::new(cache),
        Arc::new(clients),
        PromptAssembler::new(None, 10),
        config(),
    );

    Harness { index, llm, service }
}
