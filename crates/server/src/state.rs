//! Shared application state.
//!
//! All pipeline collaborators are constructed once at startup and
//! injected into request handlers through axum's `State` extractor;
//! there is no ambient global state. Generator unreachability is the
//! one fatal initialization error — every other capability degrades at
//! request time instead.

use grounded_core::{AppResult, ServerConfig};
use grounded_llm::{create_generator, TextGenerator};
use grounded_retrieval::{
    embeddings, Chunker, Document, DuckDuckGoClient, FusionEngine, VectorIndex,
};
use std::sync::Arc;
use std::time::Duration;

/// Example documents indexed at startup for demonstration, matching a
/// fresh instance's out-of-the-box behavior.
const DEMO_DOCUMENTS: [&str; 4] = [
    "LangChain is a framework for developing applications powered by language models.",
    "OpenAI developed GPT (Generative Pre-trained Transformer) models, including GPT-3 and GPT-4.",
    "FAISS is a library for efficient similarity search and clustering of dense vectors.",
    "nomic-embed-text is an embedding model for text data.",
];

/// Dependency-injected state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub chunker: Arc<Chunker>,
    pub index: Arc<VectorIndex>,
    pub fusion: Arc<FusionEngine>,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Construct the full pipeline from configuration.
    ///
    /// Verifies the generation runtime is reachable; failure there is
    /// fatal to the process by design.
    pub async fn initialize(config: ServerConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = embeddings::create_provider(
            "ollama",
            &config.embedding_model,
            Some(config.ollama_url.as_str()),
        )?;
        let index = Arc::new(VectorIndex::new(embedder));

        let web = Arc::new(DuckDuckGoClient::new(Duration::from_secs(
            config.search_timeout_secs,
        )));

        let fusion = Arc::new(FusionEngine::new(
            index.clone(),
            web,
            config.relevance_threshold,
            config.retrieval_k,
        ));

        let chunker = Arc::new(Chunker::new(config.chunk_size, config.chunk_overlap));

        let generator = create_generator("ollama", Some(config.ollama_url.as_str()))?;
        generator.check_health().await?;

        Ok(Self {
            config: Arc::new(config),
            chunker,
            index,
            fusion,
            generator,
        })
    }

    /// Index the demonstration documents.
    ///
    /// An unreachable embedding backend is logged, not fatal: the
    /// server still answers from web search alone.
    pub async fn seed_demo_documents(&self) {
        let documents: Vec<Document> = DEMO_DOCUMENTS.iter().copied().map(Document::new).collect();
        let texts: Vec<String> = documents.into_iter().map(|d| d.text).collect();
        let chunks = self.chunker.split(&texts);

        match self.index.upsert(chunks).await {
            Ok(count) => tracing::info!("Seeded {} demonstration chunks", count),
            Err(e) => tracing::warn!("Could not seed demonstration documents: {}", e),
        }
    }
}
