//! pinecone-hybrid - Hybrid dense + sparse retrieval over Pinecone
//!
//! Composes three external collaborators behind capability traits:
//!
//! - **Database client** (`vector_db`): authenticates and hands out an index
//! - **Embeddings provider** (`embeddings`): text → dense vector
//! - **Tokenizer** (`tokenizer`): text → token ids for sparse vectors
//!
//! The `retriever` module combines them; ranking and fusion stay server-side.

pub mod errors;
pub mod config;

// Re-export commonly used types
pub use errors::{HybridError, Result};

pub mod bootstrap;
pub mod cli;
pub mod embeddings;
pub mod tokenizer;
pub mod vector_db;
pub mod retriever;

// Result rendering and the shared query flow
pub mod display_mode;
pub use display_mode::DisplayMode;
pub mod execution;

#[cfg(test)]
mod test_support;
