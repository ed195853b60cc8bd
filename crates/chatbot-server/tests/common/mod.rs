//! Fakes shared by the integration tests.
#![allow(dead_code)]

use anyhow::Result;
use axum::Router;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use chatbot_server::database::{MessageStore, Sender, StoredMessage};
use chatbot_server::models::chat::ChatMessage;
use chatbot_server::router::build_router;
use chatbot_server::services::embedding_service::{EmbeddingBackend, TextEncoder};
use chatbot_server::services::llm_service::LlmProvider;
use chatbot_server::services::vector_service::{MatchMetadata, RetrievalMatch, RetrievalProvider};
use chatbot_server::services::{
    ClientManager, EmbeddingCache, PipelineConfig, PromptAssembler, RagService, SessionHandler,
};
use chatbot_server::state::AppState;
use chatbot_server::utils::StoreError;

pub const WRITE_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Default)]
pub struct RecordingStore {
    pub messages: Mutex<Vec<StoredMessage>>,
    /// Inserts from this sender are recorded and then never complete.
    pub stall: Option<Sender>,
}

impl RecordingStore {
    pub fn stalling(sender: Sender) -> Self {
        Self {
            stall: Some(sender),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl MessageStore for RecordingStore {
    async fn insert(&self, message: &StoredMessage) -> Result<(), StoreError> {
        self.messages.lock().push(message.clone());
        if self.stall == Some(message.sender) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct CharCountEncoder;

#[async_trait::async_trait]
impl TextEncoder for CharCountEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.chars().count() as f32])
    }
}

struct LocalEmbeddings;

#[async_trait::async_trait]
impl EmbeddingBackend for LocalEmbeddings {
    async fn load(&self, _model: &str) -> Result<Arc<dyn TextEncoder>> {
        Ok(Arc::new(CharCountEncoder))
    }
}

struct StaticIndex(Vec<RetrievalMatch>);

#[async_trait::async_trait]
impl RetrievalProvider for StaticIndex {
    async fn query(&self, _vector: &[f32], top_k: usize, _namespace: &str) -> Result<Vec<RetrievalMatch>> {
        Ok(self.0.iter().take(top_k).cloned().collect())
    }
}

struct ScriptedLlm(Option<String>);

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, _messages: &[ChatMessage], _model: &str) -> Result<String> {
        match &self.0 {
            Some(reply) => Ok(reply.clone()),
            None => anyhow::bail!("upstream returned 502"),
        }
    }
}

fn snippet(id: &str, score: f32, text: &str) -> RetrievalMatch {
    RetrievalMatch {
        id: id.to_string(),
        score,
        metadata: MatchMetadata {
            text: text.to_string(),
            extra: Default::default(),
        },
    }
}

/// Full router over in-process fakes. `reply: None` makes every completion fail.
pub fn app(reply: Option<&str>, store: Arc<RecordingStore>) -> Router {
    let index: Arc<dyn RetrievalProvider> = Arc::new(StaticIndex(vec![
        snippet("a", 0.92, "To create a channel, click +New..."),
        snippet("b", 0.81, "Channels organize conversations..."),
    ]));
    let llm: Arc<dyn LlmProvider> = Arc::new(ScriptedLlm(reply.map(str::to_string)));

    let clients = ClientManager::new(
        Box::new(move || -> Result<Arc<dyn RetrievalProvider>> { Ok(index.clone()) }),
        Box::new(move || -> Result<Arc<dyn LlmProvider>> { Ok(llm.clone()) }),
    );

    let rag = RagService::new(
        Arc::new(EmbeddingCache::new(Arc::new(LocalEmbeddings), 128, Duration::from_secs(1))),
        Arc::new(clients),
        PromptAssembler::new(None, 10),
        PipelineConfig {
            embedding_model: "sentence-transformers/all-mpnet-base-v2".to_string(),
            namespace: "docs".to_string(),
            retrieval_top_k: 3,
            completion_model: "deepseek/deepseek-r1:free".to_string(),
            vector_timeout: Duration::from_secs(1),
            completion_timeout: Duration::from_secs(1),
        },
    );

    build_router(AppState {
        session_handler: Arc::new(SessionHandler::new(Arc::new(rag), store, WRITE_TIMEOUT)),
    })
}
