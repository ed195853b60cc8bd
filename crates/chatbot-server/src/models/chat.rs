use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INVALID_MESSAGE: &str = "Invalid message.";

// ===== COMPLETION MODELS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Role-tagged message sent to the completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

// ===== REQUEST MODELS =====

/// Payload of an inbound `chat_message` event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// Lenient decoding: anything that is not an object with a string
    /// `message` decodes to an empty request.
    pub fn from_value(data: Option<Value>) -> Self {
        data.and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// The question to answer, or `None` when the message is missing or empty.
    pub fn question(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into() }
    }

    pub fn invalid() -> Self {
        Self::new(INVALID_MESSAGE)
    }
}

// ===== WEBSOCKET FRAMES =====

/// Raw inbound frame: `{"event": "...", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ChatResponse(ChatResponse),
}
