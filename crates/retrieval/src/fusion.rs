//! Retrieval fusion engine.
//!
//! Merges local vector retrieval and live web search into one grounded
//! context with attributed sources. This is the pipeline's core
//! decision logic: the relevance gate is a hard cutoff, web search is
//! always attempted, and no partial-source failure ever escapes —
//! `fuse` is infallible by contract.

use crate::index::VectorIndex;
use crate::types::FusedContext;
use crate::web::SearchProvider;
use std::sync::Arc;

/// Section header for gated-in local retrieval results.
const LOCAL_HEADER: &str = "Information from local documents:\n";

/// Section header for web search results.
const WEB_HEADER: &str = "Information from web search:\n";

/// Context fed to the generator when both retrieval sources came up
/// empty, so the model states it found nothing instead of guessing.
const EMPTY_CONTEXT_PLACEHOLDER: &str =
    "No relevant information found in local documents or web search.";

/// Orchestrates local retrieval, the relevance gate, and web search
/// augmentation for one question at a time.
pub struct FusionEngine {
    index: Arc<VectorIndex>,
    web: Arc<dyn SearchProvider>,
    relevance_threshold: f32,
    top_k: usize,
}

impl FusionEngine {
    /// Create a fusion engine over the given retrieval sources.
    ///
    /// `relevance_threshold` is compared against cosine similarity
    /// (higher = more similar); `top_k` bounds local retrieval.
    pub fn new(
        index: Arc<VectorIndex>,
        web: Arc<dyn SearchProvider>,
        relevance_threshold: f32,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            web,
            relevance_threshold,
            top_k,
        }
    }

    /// Fuse retrieval sources for a question.
    ///
    /// 1. Local similarity search; an unavailable index degrades to
    ///    zero results.
    /// 2. Relevance gate: local chunks are included only when the top
    ///    score clears the threshold — below it they are fully omitted,
    ///    not included with a caveat.
    /// 3. Web search runs unconditionally; failure degrades to an
    ///    empty contribution.
    /// 4. If both sources are empty, a placeholder section still
    ///    reaches the generator.
    pub async fn fuse(&self, question: &str) -> FusedContext {
        let mut fused = FusedContext::default();

        let scored = match self.index.search(question, self.top_k).await {
            Ok(scored) => scored,
            Err(e) => {
                tracing::warn!("Local retrieval degraded to empty results: {}", e);
                Vec::new()
            }
        };

        let top_score = scored.first().map(|s| s.score);
        match top_score {
            Some(score) if score >= self.relevance_threshold => {
                tracing::debug!(
                    "Relevance gate open (top score {:.3} >= {:.3}), including {} chunks",
                    score,
                    self.relevance_threshold,
                    scored.len()
                );

                let local_text = scored
                    .iter()
                    .map(|s| s.chunk.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                fused.sections.push(format!("{}{}", LOCAL_HEADER, local_text));
                fused
                    .sources
                    .extend(scored.iter().map(|s| s.chunk.text.clone()));
            }
            Some(score) => {
                tracing::debug!(
                    "Relevance gate closed (top score {:.3} < {:.3}), omitting local documents",
                    score,
                    self.relevance_threshold
                );
            }
            None => {
                tracing::debug!("No local results, relevance gate closed");
            }
        }

        // Web search always runs, independent of the gate.
        match self.web.search(question).await {
            Ok(result) => {
                let trimmed = result.trim();
                if !trimmed.is_empty() {
                    fused.sections.push(format!("{}{}", WEB_HEADER, trimmed));
                    fused
                        .sources
                        .push(format!("Web Search Results: {}", trimmed));
                }
            }
            Err(e) => {
                tracing::warn!("Web search degraded to empty results: {}", e);
            }
        }

        if fused.sections.is_empty() {
            fused.sections.push(EMPTY_CONTEXT_PLACEHOLDER.to_string());
        }

        fused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbedder;
    use crate::types::Chunk;
    use crate::web::SearchProvider;
    use grounded_core::{AppError, AppResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted web search backend that counts invocations.
    struct StubSearch {
        result: AppResult<String>,
        calls: AtomicUsize,
    }

    impl StubSearch {
        fn returning(text: &str) -> Self {
            Self {
                result: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn timing_out() -> Self {
            Self {
                result: Err(AppError::Search("request timed out".to_string())),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AppError::Search(e.to_string())),
            }
        }
    }

    fn empty_index() -> Arc<VectorIndex> {
        Arc::new(VectorIndex::new(Arc::new(MockEmbedder::new(128))))
    }

    #[tokio::test]
    async fn test_empty_index_web_only() {
        let web = Arc::new(StubSearch::returning("Paris is the capital of France."));
        let engine = FusionEngine::new(empty_index(), web.clone(), 0.7, 4);

        let fused = engine.fuse("What is the capital of France?").await;

        assert_eq!(fused.sections.len(), 1);
        assert!(fused.sections[0].starts_with("Information from web search:"));
        assert_eq!(
            fused.sources,
            vec!["Web Search Results: Paris is the capital of France.".to_string()]
        );
        assert_eq!(web.call_count(), 1);
    }

    #[tokio::test]
    async fn test_gate_open_includes_local_then_web() {
        let index = empty_index();
        index
            .upsert(vec![Chunk::new("FAISS is a library for similarity search")])
            .await
            .unwrap();

        let web = Arc::new(StubSearch::returning("web blurb"));
        let engine = FusionEngine::new(index, web.clone(), 0.7, 4);

        // Exact text match scores ~1.0 with the mock embedder.
        let fused = engine.fuse("FAISS is a library for similarity search").await;

        assert_eq!(fused.sections.len(), 2);
        assert!(fused.sections[0].starts_with("Information from local documents:"));
        assert!(fused.sections[1].starts_with("Information from web search:"));
        assert_eq!(
            fused.sources,
            vec![
                "FAISS is a library for similarity search".to_string(),
                "Web Search Results: web blurb".to_string(),
            ]
        );
        assert_eq!(web.call_count(), 1);
    }

    #[tokio::test]
    async fn test_gate_closed_fully_omits_local() {
        let index = empty_index();
        index
            .upsert(vec![Chunk::new("gardening tips for tomato plants")])
            .await
            .unwrap();

        let web = Arc::new(StubSearch::returning("web blurb"));
        let engine = FusionEngine::new(index, web.clone(), 0.7, 4);

        let fused = engine.fuse("quantum chromodynamics lattice methods").await;

        // Below-threshold local results contribute nothing at all.
        assert_eq!(fused.sections.len(), 1);
        assert!(fused.sections[0].starts_with("Information from web search:"));
        assert_eq!(fused.sources.len(), 1);
        assert!(fused.sources[0].starts_with("Web Search Results:"));
    }

    #[tokio::test]
    async fn test_web_search_runs_even_when_gate_open() {
        let index = empty_index();
        index.upsert(vec![Chunk::new("known fact")]).await.unwrap();

        let web = Arc::new(StubSearch::returning("augmentation"));
        let engine = FusionEngine::new(index, web.clone(), 0.7, 4);

        engine.fuse("known fact").await;
        engine.fuse("unrelated question entirely").await;

        // Exactly once per request, regardless of the gate outcome.
        assert_eq!(web.call_count(), 2);
    }

    #[tokio::test]
    async fn test_both_sources_empty_yields_placeholder() {
        let web = Arc::new(StubSearch::returning("   "));
        let engine = FusionEngine::new(empty_index(), web, 0.7, 4);

        let fused = engine.fuse("anything").await;

        assert_eq!(
            fused.sections,
            vec!["No relevant information found in local documents or web search.".to_string()]
        );
        assert!(fused.sources.is_empty());
    }

    #[tokio::test]
    async fn test_web_timeout_does_not_affect_local_section() {
        let index = empty_index();
        index
            .upsert(vec![Chunk::new("the moon orbits the earth")])
            .await
            .unwrap();

        let web = Arc::new(StubSearch::timing_out());
        let engine = FusionEngine::new(index, web.clone(), 0.7, 4);

        let fused = engine.fuse("the moon orbits the earth").await;

        assert_eq!(fused.sections.len(), 1);
        assert!(fused.sections[0].starts_with("Information from local documents:"));
        assert_eq!(fused.sources, vec!["the moon orbits the earth".to_string()]);
        assert_eq!(web.call_count(), 1);
    }

    #[tokio::test]
    async fn test_web_result_is_trimmed() {
        let web = Arc::new(StubSearch::returning("  padded result  \n"));
        let engine = FusionEngine::new(empty_index(), web, 0.7, 4);

        let fused = engine.fuse("anything").await;

        assert_eq!(fused.sections[0], "Information from web search:\npadded result");
        assert_eq!(fused.sources, vec!["Web Search Results: padded result".to_string()]);
    }
}
