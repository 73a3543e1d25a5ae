//! Capability traits for the vector database
//!
//! `DatabaseClient` authenticates and hands out index handles; `VectorIndex`
//! is the data-plane handle the retriever queries. Both are object-safe so a
//! fake can stand in for the real service.

use async_trait::async_trait;
use std::sync::Arc;

use super::types::{IndexStats, QueryRequest, QueryResponse, Vector};
use crate::errors::Result;

#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Authenticate against `environment` with `api_key`
    async fn init(&mut self, environment: &str, api_key: &str) -> Result<()>;

    /// Resolve a named index; requires a successful `init`
    async fn index(&self, name: &str) -> Result<Arc<dyn VectorIndex>>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Run a (possibly hybrid) similarity query; matches come back ranked
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse>;

    /// Insert or overwrite vectors, returning the number written
    async fn upsert(&self, vectors: Vec<Vector>, namespace: Option<&str>) -> Result<usize>;

    async fn describe_stats(&self) -> Result<IndexStats>;
}
