//! Deterministic mock embedding backend for tests and development.

use crate::embeddings::provider::EmbeddingProvider;
use grounded_core::AppResult;

/// Content-aware mock embedder.
///
/// Hashes words and character trigrams into a fixed-dimension vector
/// and normalizes it. Not semantically meaningful, but deterministic
/// and content-dependent: identical texts embed identically (cosine
/// similarity 1.0) and unrelated texts diverge, which is all the
/// relevance-gate tests need.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock embedder with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower.split_whitespace().filter(|w| w.len() > 2) {
            let word_dim = hash_bytes(word.as_bytes(), 31) as usize % self.dimensions;
            vector[word_dim] += 1.0;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = hash_bytes(trigram.as_bytes(), 37) as usize % self.dimensions;
                vector[dim] += 0.5;
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

fn hash_bytes(bytes: &[u8], seed: u64) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, b| acc.wrapping_mul(seed).wrapping_add(*b as u64))
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-mock"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dimensions_and_normalization() {
        let embedder = MockEmbedder::new(384);
        let embedding = embedder.embed("hello world").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = MockEmbedder::new(384);
        let first = embedder.embed("retrieval fusion").await.unwrap();
        let second = embedder.embed("retrieval fusion").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_texts_diverge() {
        let embedder = MockEmbedder::new(384);
        let a = embedder.embed("vector similarity search").await.unwrap();
        let b = embedder.embed("chocolate cake recipe").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = MockEmbedder::new(64);
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = MockEmbedder::new(128);
        let batch = embedder
            .embed_batch(&["alpha beta".to_string(), "gamma delta".to_string()])
            .await
            .unwrap();
        let single = embedder.embed("alpha beta").await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], single);
    }
}
