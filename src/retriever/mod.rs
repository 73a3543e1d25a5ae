//! Hybrid retrieval
//!
//! - Sparse: token-frequency encoding and alpha weighting
//! - Document: match → document mapping
//! - Hybrid: the retriever composing embeddings, tokenizer and index

pub mod document;
pub mod hybrid;
pub mod sparse;

pub use document::{Document, DEFAULT_TEXT_KEY};
pub use hybrid::{HybridRetriever, Retriever, RetrieverConfig, SearchParams};
pub use sparse::{encode_sparse, hybrid_scale};
