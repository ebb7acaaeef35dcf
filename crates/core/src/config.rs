//! Configuration for the Grounded answer server.
//!
//! All options are environment-driven (the server binary maps them to
//! `GROUNDED_*` variables via clap) and carry documented defaults, so a
//! bare `grounded` invocation against a local Ollama instance works out
//! of the box.

use serde::{Deserialize, Serialize};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default generation model served by Ollama.
pub const DEFAULT_MODEL: &str = "llama3";

/// Default embedding model served by Ollama.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Default Ollama API endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Relevance gate cutoff for local retrieval results.
///
/// Cosine similarity, higher = more similar. If the best-scoring chunk
/// falls below this value, local documents are excluded from the fused
/// context entirely. This materially changes answer grounding; tune it
/// per embedding model.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.7;

/// Default maximum chunk length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between adjacent chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default number of chunks retrieved per query.
pub const DEFAULT_RETRIEVAL_K: usize = 4;

/// Default web search budget, in seconds.
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the answer server.
///
/// Constructed once at startup and shared (read-only) across request
/// handlers; there is no ambient global configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,

    /// Generation model identifier
    pub model: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Base URL of the Ollama runtime
    pub ollama_url: String,

    /// Relevance gate cutoff (cosine similarity, higher = more similar)
    pub relevance_threshold: f32,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    pub retrieval_k: usize,

    /// Web search timeout in seconds
    pub search_timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            search_timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            log_level: None,
        }
    }
}

impl ServerConfig {
    /// Validate option combinations that cannot be expressed in types.
    pub fn validate(&self) -> crate::AppResult<()> {
        if self.chunk_size == 0 {
            return Err(crate::AppError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(crate::AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.retrieval_k == 0 {
            return Err(crate::AppError::Config(
                "retrieval_k must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert_eq!(config.retrieval_k, 4);
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        let config = ServerConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let config = ServerConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_retrieval_k() {
        let config = ServerConfig {
            retrieval_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
