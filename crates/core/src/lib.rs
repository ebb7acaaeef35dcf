//! Grounded Core Library
//!
//! Foundational utilities for the Grounded answer server:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Server configuration

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{AppError, AppResult};
