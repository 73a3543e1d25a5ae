//! Vector database access
//!
//! Capability traits, wire types and the Pinecone REST implementation.

pub mod pinecone;
pub mod traits;
pub mod types;

pub use pinecone::{PineconeClient, PineconeIndex, PineconeSettings};
pub use traits::{DatabaseClient, VectorIndex};
pub use types::{
    IndexStats, NamespaceSummary, QueryRequest, QueryResponse, ScoredVector, SparseValues, Vector,
};
