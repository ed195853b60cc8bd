use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::SessionHandler;

/// `POST /api/chat` for clients that cannot hold a socket. Same flow and
/// replies as the `chat_message` event; unreadable bodies count as empty.
pub async fn chat_handler(
    State(session_handler): State<Arc<SessionHandler>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<ChatResponse> {
    let data = match payload {
        Ok(Json(value)) => Some(value),
        Err(rejection) => {
            debug!("Unreadable chat body: {}", rejection);
            None
        }
    };

    let request = ChatRequest::from_value(data);
    Json(session_handler.handle(&request).await)
}
