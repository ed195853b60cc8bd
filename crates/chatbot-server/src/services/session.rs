use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::database::{MessageStore, StoredMessage};
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::rag_service::RagService;
use crate::utils::StoreError;

pub const FALLBACK_RESPONSE: &str = "Sorry, I encountered an error processing your request.";

/// Runs one inbound chat message to its reply.
///
/// Empty messages are answered with `Invalid message.` and touch nothing.
/// Otherwise the user message is stored, the pipeline runs, its result (or
/// the fallback text on any stage failure) is stored as the bot message, and
/// that text is returned for emission. Store failures are logged only, and
/// each write is bounded by `write_timeout` so a stalled store cannot hold
/// back the reply.
pub struct SessionHandler {
    rag: Arc<RagService>,
    store: Arc<dyn MessageStore>,
    write_timeout: Duration,
}

impl SessionHandler {
    pub fn new(rag: Arc<RagService>, store: Arc<dyn MessageStore>, write_timeout: Duration) -> Self {
        Self {
            rag,
            store,
            write_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    pub async fn handle(&self, request: &ChatRequest) -> ChatResponse {
        let Some(question) = request.question() else {
            warn!("Rejected empty chat message");
            return ChatResponse::invalid();
        };

        self.persist(StoredMessage::user(question)).await;

        let response = match self.rag.answer(question).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, detail = ?e, "Answer pipeline failed");
                FALLBACK_RESPONSE.to_string()
            }
        };

        info!(response = %response, "Response");

        self.persist(StoredMessage::bot(response.as_str())).await;

        ChatResponse::new(response)
    }

    async fn persist(&self, message: StoredMessage) {
        let result = tokio::time::timeout(self.write_timeout, self.store.insert(&message))
            .await
            .unwrap_or(Err(StoreError::Timeout(self.write_timeout)));

        if let Err(e) = result {
            error!(
                sender = message.sender.as_str(),
                error = %e,
                "Failed to persist chat message"
            );
        }
    }
}
