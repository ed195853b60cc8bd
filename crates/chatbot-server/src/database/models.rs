use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One side of an exchange, as written to the message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl StoredMessage {
    pub fn user(message: impl Into<String>) -> Self {
        Self::now(Sender::User, message)
    }

    pub fn bot(message: impl Into<String>) -> Self {
        Self::now(Sender::Bot, message)
    }

    fn now(sender: Sender, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
