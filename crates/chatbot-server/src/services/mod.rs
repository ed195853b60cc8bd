pub mod client_manager;
pub mod embedding_cache;
pub mod embedding_service;
pub mod llm_service;
pub mod prompt_assembler;
pub mod rag_service;
pub mod sanitizer;
pub mod session;
pub mod vector_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use client_manager::ClientManager;
pub use embedding_cache::EmbeddingCache;
pub use embedding_service::EmbeddingService;
pub use llm_service::LlmService;
pub use prompt_assembler::PromptAssembler;
pub use rag_service::{PipelineConfig, RagService};
pub use session::SessionHandler;
pub use vector_service::VectorIndexClient;
