//! Domain types for the retrieval pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document submitted for ingestion. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Raw document text
    pub text: String,

    /// Optional descriptive metadata (e.g., filename)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document from bare text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A bounded, possibly-overlapping segment of a document's text.
///
/// The unit stored and searched by the vector index. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
}

impl Chunk {
    /// Create a chunk. Callers must not pass empty text; the chunker
    /// never does.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A chunk paired with its similarity score for one query.
///
/// Scores are cosine similarity: higher = more similar, range [-1, 1].
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Separator rendered between context sections in the final prompt.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// The merged retrieval result for one question.
///
/// Built once per request by the fusion engine, consumed immediately by
/// the prompt assembler; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusedContext {
    /// Context sections in presentation order: local documents first,
    /// web search second, or a single placeholder when both are absent.
    pub sections: Vec<String>,

    /// Flat attribution list forwarded to the caller after the answer.
    pub sources: Vec<String>,
}

impl FusedContext {
    /// Render the sections into the single context string fed to the
    /// prompt template.
    pub fn context(&self) -> String {
        self.sections.join(SECTION_SEPARATOR)
    }
}
