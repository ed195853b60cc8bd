use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::services::embedding_service::{EmbeddingBackend, TextEncoder};
use crate::utils::{with_timeout, PipelineError, Stage};

type CacheKey = (String, String);

/// Memoizing front of the embedding backend.
///
/// Vectors are kept in a bounded LRU keyed on the exact `(text, model)` pair.
/// Each model is loaded once; concurrent first uses of the same model wait on
/// the same initialization.
pub struct EmbeddingCache {
    backend: Arc<dyn EmbeddingBackend>,
    encoders: DashMap<String, Arc<OnceCell<Arc<dyn TextEncoder>>>>,
    vectors: Mutex<LruCache<CacheKey, Vec<f32>>>,
    timeout: Duration,
}

impl EmbeddingCache {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, capacity: usize, timeout: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        info!("Initializing embedding cache with capacity {}", capacity);

        Self {
            backend,
            encoders: DashMap::new(),
            vectors: Mutex::new(LruCache::new(capacity)),
            timeout,
        }
    }

    /// Embed `text` with `model`, serving repeats from the cache.
    pub async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>, PipelineError> {
        let key = (text.to_string(), model.to_string());

        let cached = self.vectors.lock().get(&key).cloned();
        if let Some(hit) = cached {
            debug!("Embedding cache hit ({} chars, model {})", text.len(), model);
            return Ok(hit);
        }

        let vector = with_timeout(Stage::Embedding, self.timeout, async {
            let encoder = self.encoder(model).await?;
            encoder.encode(text).await.map_err(PipelineError::retrieval)
        })
        .await?;

        // A concurrent miss may have filled the slot first; keep its vector so
        // every caller sees the same result for the key.
        let mut vectors = self.vectors.lock();
        if let Some(existing) = vectors.get(&key) {
            return Ok(existing.clone());
        }
        vectors.put(key, vector.clone());
        Ok(vector)
    }

    async fn encoder(&self, model: &str) -> Result<Arc<dyn TextEncoder>, PipelineError> {
        let cell = self.encoders.entry(model.to_string()).or_default().clone();

        cell.get_or_try_init(|| async { self.backend.load(model).await })
            .await
            .cloned()
            .map_err(PipelineError::retrieval)
    }

    pub fn len(&self) -> usize {
        self.vectors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
