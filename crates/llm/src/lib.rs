//! Text generation crate for the Grounded answer server.
//!
//! Provides a backend-agnostic abstraction over the model runtime with
//! streaming as the primary mode of operation. The only shipped backend
//! is Ollama.
//!
//! # Example
//! ```no_run
//! use grounded_llm::{GenerationRequest, OllamaGenerator, TextGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = OllamaGenerator::new();
//! let request = GenerationRequest::new("Why is the sky blue?", "llama3");
//! let answer = generator.complete(&request).await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{GenerationRequest, TextGenerator, TokenFragment, TokenStream};
pub use factory::create_generator;
pub use providers::OllamaGenerator;
