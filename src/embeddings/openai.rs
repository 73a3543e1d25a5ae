//! OpenAI-compatible embeddings client
//!
//! Works against any endpoint speaking the `/v1/embeddings` request format
//! (OpenAI, Azure OpenAI, local servers with OpenAI compatibility).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::traits::TextEmbedder;
use crate::errors::{HybridError, Result};

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Embeddings provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// API endpoint
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Output dimension of `model`
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum texts per request
    pub batch_size: usize,
    /// Replace newlines with spaces before embedding
    pub strip_new_lines: bool,
    /// Credential; never read from or written to the config file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/embeddings".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            timeout_secs: 30,
            batch_size: 512,
            strip_new_lines: true,
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Embeddings provider backed by an OpenAI-compatible HTTP API
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddings {
    client: Client,
    config: EmbeddingsConfig,
}

impl OpenAIEmbeddings {
    pub fn new(config: EmbeddingsConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(HybridError::Configuration(
                "embeddings batch_size must be greater than 0".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        match &config.api_key {
            Some(key) if !key.trim().is_empty() => {
                let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                    HybridError::Configuration(format!("Invalid API key format: {}", e))
                })?;
                headers.insert(AUTHORIZATION, value);
            }
            _ => {
                if config.endpoint.contains("openai.com") {
                    warn!("No API key provided for {}", config.endpoint);
                }
            }
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(HybridError::Http)?;

        info!(
            "Embeddings provider: endpoint={}, model={}",
            config.endpoint, config.model
        );

        Ok(Self { client, config })
    }

    fn prepare(&self, text: &str) -> String {
        if self.config.strip_new_lines {
            text.replace('\n', " ")
        } else {
            text.to_string()
        }
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!("Embedding {} texts via {}", texts.len(), self.config.model);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| HybridError::Embedding(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HybridError::rate_limited(response.headers()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(HybridError::Embedding(format!(
                "API returned {}: {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| HybridError::Embedding(format!("Failed to parse response: {}", e)))?;

        order_embeddings(body.data, texts.len())
    }
}

/// Reorder response items by their `index` field and check the count
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(HybridError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl TextEmbedder for OpenAIEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[self.prepare(text)]).await?;
        vectors
            .pop()
            .ok_or_else(|| HybridError::Embedding("empty embedding response".to_string()))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<String> = texts.iter().map(|t| self.prepare(t)).collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size) {
            vectors.extend(self.request(chunk).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}
