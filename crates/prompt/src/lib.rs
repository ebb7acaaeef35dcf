//! Prompt crate for the Grounded answer server.
//!
//! A single fixed Handlebars template turns the fused retrieval context
//! and the user's question into the generation prompt.

pub mod assembler;

pub use assembler::assemble;
