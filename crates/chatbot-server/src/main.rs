use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use chatbot_server::config::Settings;
use chatbot_server::database::{DbPool, Repository};
use chatbot_server::router::build_router;
use chatbot_server::services::{
    ClientManager, EmbeddingCache, EmbeddingService, PipelineConfig, PromptAssembler, RagService,
    SessionHandler,
};
use chatbot_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,chatbot_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting chatbot server...");

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    info!("✅ Configuration loaded");

    // Message store
    let db_pool = DbPool::new(&settings.database).await?;
    let repository = Arc::new(Repository::new(db_pool));
    repository.ensure_schema().await?;
    info!("✅ Message store ready");

    // Embedding backend and cache
    let embedding_backend = Arc::new(EmbeddingService::new(&settings.embedding)?);
    let embedding_cache = Arc::new(EmbeddingCache::new(
        embedding_backend,
        settings.embedding.cache_capacity,
        settings.embedding.timeout(),
    ));

    // External service handles, built on first use
    let clients = Arc::new(ClientManager::from_settings(&settings));

    let rag_service = Arc::new(RagService::new(
        embedding_cache,
        clients,
        PromptAssembler::new(
            settings.prompts.system_prompt.clone(),
            settings.rag.max_context_matches,
        ),
        PipelineConfig::from_settings(&settings),
    ));

    let session_handler = Arc::new(SessionHandler::new(
        rag_service,
        repository,
        settings.database.write_timeout(),
    ));

    let app = build_router(AppState { session_handler });

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
