use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// External call that a pipeline stage waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    VectorQuery,
    Completion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Embedding => "embedding",
            Stage::VectorQuery => "vector query",
            Stage::Completion => "completion",
        };
        f.write_str(name)
    }
}

/// Failure of one answer-pipeline stage.
///
/// The detail strings carry the full cause chain of the underlying error so
/// the session boundary can log it; none of it is ever sent to the user.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },
}

impl PipelineError {
    pub fn retrieval(err: anyhow::Error) -> Self {
        Self::Retrieval(format!("{err:?}"))
    }

    pub fn generation(err: anyhow::Error) -> Self {
        Self::Generation(format!("{err:?}"))
    }
}

/// Bound an external call; expiry becomes a stage failure.
pub async fn with_timeout<T, F>(stage: Stage, after: Duration, fut: F) -> Result<T, PipelineError>
where
    F: std::future::Future<Output = Result<T, PipelineError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| PipelineError::Timeout { stage, after })?
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Write timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
