//! Embedding provider trait and factory.

use grounded_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding backends.
///
/// Failures surface as `AppError::Index` and are degraded to "no local
/// results" by the fusion engine; providers are deliberately not
/// health-checked at construction time.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Index("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
pub fn create_provider(
    provider: &str,
    model: &str,
    endpoint: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "ollama" => Ok(Arc::new(super::providers::ollama::OllamaEmbedder::new(
            model, endpoint,
        ))),

        "mock" => Ok(Arc::new(super::providers::mock::MockEmbedder::new(384))),

        other => Err(AppError::Index(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            other
        ))),
    }
}
