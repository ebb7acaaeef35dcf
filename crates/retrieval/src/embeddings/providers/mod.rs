//! Embedding backend implementations.

pub mod mock;
pub mod ollama;
