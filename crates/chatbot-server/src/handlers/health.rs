use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::services::SessionHandler;
use crate::utils::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Ready once the message store answers.
pub async fn readiness_check(
    State(session_handler): State<Arc<SessionHandler>>,
) -> Result<StatusCode, ApiError> {
    session_handler
        .store()
        .ping()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

    Ok(StatusCode::OK)
}
