use super::{DbPool, StoredMessage};
use crate::utils::StoreError;
use tracing::{debug, info};

/// Append-only sink for both sides of every exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: &StoredMessage) -> Result<(), StoreError>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the chat table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS chat_messages (
                id BIGSERIAL PRIMARY KEY,
                sender TEXT NOT NULL CHECK (sender IN ('user', 'bot')),
                message TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
               )"#,
        )
        .execute(self.pool.get_pool())
        .await?;

        info!("chat_messages table ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageStore for Repository {
    async fn insert(&self, message: &StoredMessage) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (sender, message, created_at)
               VALUES ($1, $2, $3)"#,
        )
        .bind(message.sender.as_str())
        .bind(&message.message)
        .bind(message.timestamp)
        .execute(self.pool.get_pool())
        .await?;

        debug!("Stored {} message ({} chars)", message.sender.as_str(), message.message.len());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool.get_pool()).await?;
        Ok(())
    }
}
