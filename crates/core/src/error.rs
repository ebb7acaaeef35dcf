//! Error types for the Grounded answer server.
//!
//! This module defines a unified error enum covering every error category
//! in the pipeline: configuration, I/O, generation, vector index, web
//! search, and input validation.

use thiserror::Error;

/// Unified error type for the Grounded answer server.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// The retrieval adapters follow a swallow-at-the-boundary policy: the
/// fusion engine converts `Index` and `Search` errors into empty
/// contributions instead of failing the request. Only generator
/// unreachability at startup is fatal to the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Answer generation (LLM) errors
    #[error("Generation error: {0}")]
    Generation(String),

    /// Vector index / embedding errors; degraded to "no local results"
    #[error("Index unavailable: {0}")]
    Index(String),

    /// Web search provider errors (timeout or transport failure);
    /// degraded to "no web results"
    #[error("Search provider error: {0}")]
    Search(String),

    /// Rejected input, e.g. a non-PDF upload
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Index("embedding model offline".to_string());
        assert_eq!(err.to_string(), "Index unavailable: embedding model offline");

        let err = AppError::Search("request timed out".to_string());
        assert_eq!(err.to_string(), "Search provider error: request timed out");
    }

    #[test]
    fn test_serde_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
