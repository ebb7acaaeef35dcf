//! Retrieval pipeline for the Grounded answer server.
//!
//! Covers everything between raw document text and a fused, attributed
//! context: chunking, embedding, vector similarity search with a
//! relevance gate, and best-effort web search augmentation.

pub mod chunker;
pub mod embeddings;
pub mod fusion;
pub mod index;
pub mod types;
pub mod web;

// Re-export commonly used types
pub use chunker::Chunker;
pub use embeddings::{EmbeddingProvider, MockEmbedder, OllamaEmbedder};
pub use fusion::FusionEngine;
pub use index::VectorIndex;
pub use types::{Chunk, Document, FusedContext, ScoredChunk};
pub use web::{DuckDuckGoClient, SearchProvider};
