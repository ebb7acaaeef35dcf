//! In-memory vector index with brute-force cosine similarity search.
//!
//! The index owns chunks once upserted; a chunk becomes searchable only
//! after `upsert` returns. Interior locking makes concurrent `upsert`
//! and `search` safe without callers imposing their own
//! synchronization. Persistence is out of scope; the process owns the
//! index for its lifetime.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Chunk, ScoredChunk};
use grounded_core::AppResult;
use std::sync::{Arc, RwLock};

struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Shared, process-wide vector index.
///
/// Wraps the embedding capability and a guarded in-memory store of
/// embedded chunks. Re-ingesting the same document inserts independent
/// copies; no deduplication is performed.
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<IndexedChunk>>,
}

impl VectorIndex {
    /// Create an empty index over the given embedding backend.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Embed and insert chunks. Returns the number of chunks added.
    ///
    /// Embedding happens outside the write lock; the insert itself is a
    /// single short critical section, so searches are never blocked on
    /// the embedding backend.
    pub async fn upsert(&self, chunks: Vec<Chunk>) -> AppResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let count = chunks.len();
        {
            let mut entries = self.entries.write().unwrap();
            for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
                entries.push(IndexedChunk { chunk, embedding });
            }
        }

        tracing::info!("Upserted {} chunks (index size: {})", count, self.len());
        Ok(count)
    }

    /// Search for the top-k chunks most similar to the query.
    ///
    /// Results are ordered by descending cosine similarity. An empty
    /// index yields an empty result, never an error; an unreachable
    /// embedding backend yields `AppError::Index`.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<ScoredChunk> = {
            let entries = self.entries.read().unwrap();
            entries
                .iter()
                .map(|entry| ScoredChunk {
                    chunk: entry.chunk.clone(),
                    score: cosine_similarity(&query_embedding, &entry.embedding),
                })
                .collect()
        };

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Vector search returned {} chunks (top score: {:.3})",
            scored.len(),
            scored.first().map(|s| s.score).unwrap_or(0.0)
        );

        Ok(scored)
    }

    /// Number of chunks currently indexed.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cosine similarity between two vectors; 0.0 for mismatched or empty
/// inputs.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
