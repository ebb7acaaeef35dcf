//! Ollama text generation backend.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md
//! Streaming responses arrive as newline-delimited JSON objects; a line
//! may span several transport chunks, so decoding keeps a carry buffer.

use crate::client::{GenerationRequest, TextGenerator, TokenFragment, TokenStream};
use futures::StreamExt;
use grounded_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Ollama `/api/generate` request format.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    stream: bool,
}

/// Ollama `/api/generate` response format (one object per line when
/// streaming).
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    done: bool,
}

/// Client for a local Ollama runtime.
#[derive(Debug)]
pub struct OllamaGenerator {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaGenerator {
    /// Create a client against the default endpoint, http://localhost:11434.
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_ollama_request(&self, request: &GenerationRequest, stream: bool) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            temperature: request.temperature,
            num_predict: request.max_tokens,
            stream,
        }
    }

    async fn post_generate(&self, body: &OllamaGenerateRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one newline-delimited JSON line into a fragment.
fn parse_fragment(line: &str) -> AppResult<TokenFragment> {
    let parsed: OllamaGenerateResponse = serde_json::from_str(line)
        .map_err(|e| AppError::Generation(format!("Failed to parse stream chunk: {}", e)))?;

    Ok(TokenFragment {
        text: parsed.response,
        done: parsed.done,
    })
}

#[async_trait::async_trait]
impl TextGenerator for OllamaGenerator {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &GenerationRequest) -> AppResult<String> {
        tracing::debug!(model = %request.model, "Sending completion request to Ollama");

        let body = self.to_ollama_request(request, false);
        let response = self.post_generate(&body).await?;

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(parsed.response)
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> AppResult<TokenStream> {
        tracing::debug!(model = %request.model, "Starting streaming request to Ollama");

        let body = self.to_ollama_request(request, true);
        let response = self.post_generate(&body).await?;

        // Reassemble newline-delimited JSON across transport chunk
        // boundaries before parsing.
        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| AppError::Generation(format!("Stream error: {}", e))))
            .scan(String::new(), |carry, result| {
                let fragments: Vec<AppResult<TokenFragment>> = match result {
                    Ok(bytes) => {
                        carry.push_str(&String::from_utf8_lossy(&bytes));
                        let mut out = Vec::new();
                        while let Some(newline) = carry.find('\n') {
                            let line = carry[..newline].trim().to_string();
                            carry.drain(..=newline);
                            if !line.is_empty() {
                                out.push(parse_fragment(&line));
                            }
                        }
                        out
                    }
                    Err(e) => vec![Err(e)],
                };
                futures::future::ready(Some(futures::stream::iter(fragments)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }

    async fn check_health(&self) -> AppResult<()> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Ollama not reachable at {}: {}", self.base_url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Generation(format!(
                "Ollama health check failed with status {}",
                response.status()
            )));
        }

        tracing::info!("Ollama reachable at {}", self.base_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let generator = OllamaGenerator::new();
        assert_eq!(generator.provider_name(), "ollama");
        assert_eq!(generator.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_request_conversion() {
        let generator = OllamaGenerator::new();
        let request = GenerationRequest::new("Hello", "llama3").with_max_tokens(100);

        let body = generator.to_ollama_request(&request, true);
        assert_eq!(body.model, "llama3");
        assert_eq!(body.prompt, "Hello");
        assert_eq!(body.num_predict, Some(100));
        assert!(body.stream);
    }

    #[test]
    fn test_parse_fragment() {
        let fragment =
            parse_fragment(r#"{"model":"llama3","response":"Paris","done":false}"#).unwrap();
        assert_eq!(fragment.text, "Paris");
        assert!(!fragment.done);

        let last = parse_fragment(r#"{"model":"llama3","response":"","done":true}"#).unwrap();
        assert!(last.text.is_empty());
        assert!(last.done);
    }

    #[test]
    fn test_parse_fragment_rejects_garbage() {
        assert!(parse_fragment("not json").is_err());
    }
}
