//! Generation backend factory.
//!
//! Resolves a provider name from configuration to a concrete
//! `TextGenerator`. Only Ollama is implemented; the match keeps the
//! seam open for hosted providers.

use crate::client::TextGenerator;
use crate::providers::OllamaGenerator;
use grounded_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation backend for the given provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently only "ollama")
/// * `endpoint` - Optional custom endpoint URL
pub fn create_generator(provider: &str, endpoint: Option<&str>) -> AppResult<Arc<dyn TextGenerator>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaGenerator::with_base_url(base_url)))
        }
        other => Err(AppError::Generation(format!(
            "Unknown generation provider: {}",
            other
        ))),
    }
}
