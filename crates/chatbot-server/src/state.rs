use std::sync::Arc;
use axum::extract::FromRef;

use crate::services::SessionHandler;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session_handler: Arc<SessionHandler>,
}

impl FromRef<AppState> for Arc<SessionHandler> {
    fn from_ref(state: &AppState) -> Self {
        state.session_handler.clone()
    }
}
