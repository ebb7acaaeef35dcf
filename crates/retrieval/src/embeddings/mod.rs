//! Embedding generation for the retrieval pipeline.
//!
//! Provider-agnostic: the vector index takes any `EmbeddingProvider`.
//! Shipped backends are Ollama (production) and a deterministic
//! trigram mock (tests).

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::mock::MockEmbedder;
pub use providers::ollama::OllamaEmbedder;
