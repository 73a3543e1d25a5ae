//! Hybrid dense + sparse retriever
//!
//! Composes an embeddings provider, a tokenizer and an index handle. Ranking
//! and fusion happen server-side; this type only prepares the two query
//! vectors and maps matches back to documents.

use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::document::{Document, DEFAULT_TEXT_KEY};
use super::sparse::{check_alpha, encode_sparse, hybrid_scale};
use crate::embeddings::TextEmbedder;
use crate::errors::{HybridError, Result};
use crate::tokenizer::Tokenizer;
use crate::vector_db::{QueryRequest, Vector, VectorIndex};

/// Search parameters for retrieval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of documents to return
    pub top_k: usize,
    /// Dense/sparse fusion weight (1.0 = pure dense, 0.0 = pure sparse)
    pub alpha: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 3,
            alpha: 0.5,
        }
    }
}

/// `[retriever]` section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub top_k: usize,
    pub alpha: f32,
    /// Metadata key holding document text
    pub text_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub upsert_batch_size: usize,
    pub upsert_concurrency: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        let params = SearchParams::default();
        Self {
            top_k: params.top_k,
            alpha: params.alpha,
            text_key: DEFAULT_TEXT_KEY.to_string(),
            namespace: None,
            upsert_batch_size: 32,
            upsert_concurrency: 4,
        }
    }
}

impl RetrieverConfig {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            top_k: self.top_k,
            alpha: self.alpha,
        }
    }
}

/// Anything that turns a query into ranked documents
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>>;
}

pub struct HybridRetriever {
    embeddings: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorIndex>,
    tokenizer: Arc<dyn Tokenizer>,
    params: SearchParams,
    text_key: String,
    namespace: Option<String>,
    upsert_batch_size: usize,
    upsert_concurrency: usize,
}

impl HybridRetriever {
    /// Compose a retriever. `params` are stored verbatim.
    pub fn new(
        embeddings: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorIndex>,
        tokenizer: Arc<dyn Tokenizer>,
        params: SearchParams,
    ) -> Self {
        let defaults = RetrieverConfig::default();
        Self {
            embeddings,
            index,
            tokenizer,
            params,
            text_key: defaults.text_key,
            namespace: defaults.namespace,
            upsert_batch_size: defaults.upsert_batch_size,
            upsert_concurrency: defaults.upsert_concurrency,
        }
    }

    pub fn from_config(
        embeddings: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorIndex>,
        tokenizer: Arc<dyn Tokenizer>,
        config: &RetrieverConfig,
    ) -> Self {
        Self::new(embeddings, index, tokenizer, config.params())
            .with_text_key(config.text_key.clone())
            .with_namespace(config.namespace.clone())
            .with_upsert_batching(config.upsert_batch_size, config.upsert_concurrency)
    }

    pub fn with_text_key(mut self, text_key: impl Into<String>) -> Self {
        self.text_key = text_key.into();
        self
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Zero values are raised to 1
    pub fn with_upsert_batching(mut self, batch_size: usize, concurrency: usize) -> Self {
        self.upsert_batch_size = batch_size.max(1);
        self.upsert_concurrency = concurrency.max(1);
        self
    }

    pub fn params(&self) -> SearchParams {
        self.params
    }

    pub fn top_k(&self) -> usize {
        self.params.top_k
    }

    pub fn alpha(&self) -> f32 {
        self.params.alpha
    }

    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Retrieve at most `top_k` documents for `query`, in service order.
    ///
    /// Invalid parameters fail with `Configuration` before any external call;
    /// every external failure surfaces as `Retrieval`.
    pub async fn retrieve(&self, query: &str, top_k: usize, alpha: f32) -> Result<Vec<Document>> {
        if top_k == 0 {
            return Err(HybridError::Configuration(
                "top_k must be greater than 0".to_string(),
            ));
        }
        check_alpha(alpha)?;

        let token_ids = self
            .tokenizer
            .encode(query)
            .map_err(HybridError::into_retrieval)?;
        let sparse = encode_sparse(&token_ids);

        let dense = self
            .embeddings
            .embed_query(query)
            .await
            .map_err(HybridError::into_retrieval)?;

        let (dense, sparse) = hybrid_scale(&dense, &sparse, alpha)?;
        debug!(
            "Hybrid query: {} dense dims, {} sparse terms, alpha={}",
            dense.len(),
            sparse.len(),
            alpha
        );

        let request = QueryRequest {
            vector: dense,
            sparse_vector: if sparse.is_empty() { None } else { Some(sparse) },
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.clone(),
        };

        let response = self
            .index
            .query(request)
            .await
            .map_err(HybridError::into_retrieval)?;

        let documents: Vec<Document> = response
            .matches
            .into_iter()
            .take(top_k)
            .map(|m| Document::from_match(m, &self.text_key))
            .collect();

        info!("Retrieved {} documents for query", documents.len());
        Ok(documents)
    }

    /// Embed, sparse-encode and upsert `texts`; returns the generated ids in
    /// input order
    pub async fn add_texts(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Map<String, Value>>>,
    ) -> Result<Vec<String>> {
        if let Some(metadatas) = &metadatas {
            if metadatas.len() != texts.len() {
                return Err(HybridError::Configuration(format!(
                    "got {} texts but {} metadata entries",
                    texts.len(),
                    metadatas.len()
                )));
            }
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let dense = self.embeddings.embed_documents(&texts).await?;
        if dense.len() != texts.len() {
            return Err(HybridError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                dense.len()
            )));
        }

        let mut metadatas = metadatas.map(Vec::into_iter);
        let mut ids = Vec::with_capacity(texts.len());
        let mut vectors = Vec::with_capacity(texts.len());

        for (text, values) in texts.into_iter().zip(dense) {
            let sparse = encode_sparse(&self.tokenizer.encode(&text)?);
            let mut metadata = metadatas
                .as_mut()
                .and_then(|m| m.next())
                .unwrap_or_default();
            metadata.insert(self.text_key.clone(), Value::String(text));

            let id = Uuid::new_v4().to_string();
            ids.push(id.clone());
            vectors.push(Vector {
                id,
                values,
                sparse_values: if sparse.is_empty() { None } else { Some(sparse) },
                metadata: Some(metadata),
            });
        }

        let namespace = self.namespace.as_deref();
        let batches: Vec<Vec<Vector>> = vectors
            .chunks(self.upsert_batch_size)
            .map(<[Vector]>::to_vec)
            .collect();
        let batch_count = batches.len();

        let written: Vec<usize> = stream::iter(batches)
            .map(|batch| self.index.upsert(batch, namespace))
            .buffered(self.upsert_concurrency)
            .try_collect()
            .await?;

        info!(
            "Upserted {} vectors in {} batches into '{}'",
            written.iter().sum::<usize>(),
            batch_count,
            self.index.name()
        );

        Ok(ids)
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
        self.retrieve(query, self.params.top_k, self.params.alpha).await
    }
}
