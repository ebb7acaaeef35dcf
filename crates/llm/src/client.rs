//! Text generation abstraction and request/stream types.
//!
//! The answer pipeline treats the model runtime as a capability:
//! `generate_stream(prompt)` yields an incremental, finite, ordered
//! sequence of text fragments. This module defines that seam.

use futures::Stream;
use grounded_core::AppResult;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The fully assembled prompt
    pub prompt: String,

    /// Model identifier (e.g., "llama3")
    pub model: String,

    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Create a new request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// One incremental fragment of a streamed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFragment {
    /// Incremental text content
    pub text: String,

    /// Whether this is the final fragment of the stream
    #[serde(default)]
    pub done: bool,
}

/// Ordered, finite, non-restartable stream of generation fragments.
///
/// Fragment *n* is delivered before fragment *n+1* is requested from
/// the runtime; dropping the stream releases the underlying connection,
/// which is how cancellation propagates to the generator.
pub type TokenStream = Pin<Box<dyn Stream<Item = AppResult<TokenFragment>> + Send>>;

/// Trait for text generation backends.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// Generate a complete answer in one call.
    async fn complete(&self, request: &GenerationRequest) -> AppResult<String>;

    /// Generate an answer as a stream of incremental fragments.
    async fn generate_stream(&self, request: &GenerationRequest) -> AppResult<TokenStream>;

    /// Verify the backend is reachable.
    ///
    /// Called once at startup; failure here is the only fatal error in
    /// the pipeline.
    async fn check_health(&self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("Hello", "llama3")
            .with_temperature(0.2)
            .with_max_tokens(64);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.model, "llama3");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(64));
    }

    #[test]
    fn test_request_serialization_skips_unset_options() {
        let request = GenerationRequest::new("Hello", "llama3");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }
}
