//! Pinecone REST client
//!
//! Talks to the environment-scoped controller
//! (`https://controller.{environment}.pinecone.io`) to authenticate and look up
//! indexes, then to the index host for queries and upserts.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::traits::{DatabaseClient, VectorIndex};
use super::types::{
    IndexStats, QueryRequest, QueryResponse, UpsertRequest, UpsertResponse, Vector,
};
use crate::errors::{HybridError, Result};

const API_KEY_HEADER: &str = "Api-Key";

/// Settings for the HTTP side of the Pinecone client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Controller base URL; derived from the environment when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_url: Option<String>,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            controller_url: None,
        }
    }
}

/// `GET /actions/whoami`
#[derive(Debug, Deserialize)]
struct WhoAmIResponse {
    project_name: String,
}

/// `GET /databases/{name}`
#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Clone)]
struct Session {
    environment: String,
    api_key: String,
    project_name: String,
    controller_url: String,
}

/// Pinecone control-plane client
pub struct PineconeClient {
    client: Client,
    settings: PineconeSettings,
    session: Option<Session>,
}

impl PineconeClient {
    pub fn new(settings: PineconeSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(HybridError::Http)?;

        Ok(Self {
            client,
            settings,
            session: None,
        })
    }

    /// Project name reported by the controller, once initialized
    pub fn project_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.project_name.as_str())
    }

    /// Resolve `name` to its data-plane handle; requires a successful `init`
    pub async fn open_index(&self, name: &str) -> Result<PineconeIndex> {
        let session = self.session.as_ref().ok_or_else(|| {
            HybridError::Connection("Pinecone client used before init".to_string())
        })?;

        let url = format!("{}/databases/{}", session.controller_url, name);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &session.api_key)
            .send()
            .await
            .map_err(|e| HybridError::Connection(format!("Failed to describe index: {}", e)))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(HybridError::Connection(format!("Index '{}' not found", name)));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(HybridError::Connection(
                    "Pinecone rejected the API key".to_string(),
                ));
            }
            status => {
                return Err(HybridError::Connection(format!(
                    "Describe index returned status: {}",
                    status
                )));
            }
        }

        let description: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| HybridError::Connection(format!("Failed to parse index description: {}", e)))?;

        let status = description.status;
        if let Some(status) = &status {
            if !status.ready {
                debug!("Index '{}' reports not ready", name);
            }
        }

        let host = status
            .and_then(|s| s.host)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| index_host_for(name, &session.project_name, &session.environment));

        info!("Using index '{}' at {}", name, host);

        Ok(PineconeIndex {
            client: self.client.clone(),
            name: name.to_string(),
            base_url: host_to_url(&host),
            api_key: session.api_key.clone(),
        })
    }

    fn controller_url(&self, environment: &str) -> String {
        self.settings
            .controller_url
            .clone()
            .unwrap_or_else(|| controller_url_for(environment))
    }
}

pub fn controller_url_for(environment: &str) -> String {
    format!("https://controller.{}.pinecone.io", environment)
}

/// Fallback data-plane host when the controller does not report one
pub fn index_host_for(index: &str, project: &str, environment: &str) -> String {
    format!("{}-{}.svc.{}.pinecone.io", index, project, environment)
}

fn host_to_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", host.trim_end_matches('/'))
    }
}

#[async_trait]
impl DatabaseClient for PineconeClient {
    async fn init(&mut self, environment: &str, api_key: &str) -> Result<()> {
        let controller_url = self.controller_url(environment);
        let url = format!("{}/actions/whoami", controller_url);
        debug!("Authenticating against {}", controller_url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| HybridError::Connection(format!("Failed to reach Pinecone controller: {}", e)))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(HybridError::Connection(
                    "Pinecone rejected the API key".to_string(),
                ));
            }
            status => {
                return Err(HybridError::Connection(format!(
                    "Pinecone controller returned status: {}",
                    status
                )));
            }
        }

        let whoami: WhoAmIResponse = response
            .json()
            .await
            .map_err(|e| HybridError::Connection(format!("Failed to parse whoami response: {}", e)))?;

        info!(
            "Connected to Pinecone project '{}' in {}",
            whoami.project_name, environment
        );

        self.session = Some(Session {
            environment: environment.to_string(),
            api_key: api_key.to_string(),
            project_name: whoami.project_name,
            controller_url,
        });

        Ok(())
    }

    async fn index(&self, name: &str) -> Result<Arc<dyn VectorIndex>> {
        Ok(Arc::new(self.open_index(name).await?))
    }
}

/// Data-plane handle to one index
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    client: Client,
    name: String,
    base_url: String,
    api_key: String,
}

impl PineconeIndex {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| HybridError::Retrieval(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HybridError::rate_limited(response.headers()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HybridError::Retrieval(format!(
                "Pinecone {} returned {}: {}",
                path, status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        debug!(
            "Querying '{}' (top_k={}, sparse={})",
            self.name,
            request.top_k,
            request.sparse_vector.as_ref().map_or(0, |s| s.len())
        );

        let response = self.post("/query", &request).await?;
        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| HybridError::Retrieval(format!("Failed to parse query response: {}", e)))?;

        debug!("Query returned {} matches", body.matches.len());
        Ok(body)
    }

    async fn upsert(&self, vectors: Vec<Vector>, namespace: Option<&str>) -> Result<usize> {
        if vectors.is_empty() {
            return Ok(0);
        }

        let request = UpsertRequest {
            vectors: &vectors,
            namespace,
        };
        let response = self.post("/vectors/upsert", &request).await?;
        let body: UpsertResponse = response
            .json()
            .await
            .map_err(|e| HybridError::Retrieval(format!("Failed to parse upsert response: {}", e)))?;

        debug!("Upserted {} vectors into '{}'", body.upserted_count, self.name);
        Ok(body.upserted_count)
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        let response = self
            .post("/describe_index_stats", &serde_json::json!({}))
            .await?;
        let stats: IndexStats = response
            .json()
            .await
            .map_err(|e| HybridError::Retrieval(format!("Failed to parse index stats: {}", e)))?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, CannedResponse};

    #[test]
    fn test_controller_url() {
        assert_eq!(
            controller_url_for("us-west1-gcp"),
            "https://controller.us-west1-gcp.pinecone.io"
        );
    }

    #[test]
    fn test_index_host_fallback() {
        assert_eq!(
            index_host_for("docs", "abc123", "us-west1-gcp"),
            "docs-abc123.svc.us-west1-gcp.pinecone.io"
        );
    }

    #[test]
    fn test_host_to_url() {
        assert_eq!(host_to_url("docs.svc.pinecone.io"), "https://docs.svc.pinecone.io");
        assert_eq!(host_to_url("http://localhost:5080/"), "http://localhost:5080");
    }

    #[test]
    fn test_controller_override() {
        let client = PineconeClient::new(PineconeSettings {
            timeout_secs: 5,
            controller_url: Some("http://127.0.0.1:9".to_string()),
        })
        .unwrap();
        assert_eq!(client.controller_url("ignored"), "http://127.0.0.1:9");
        assert!(client.project_name().is_none());
    }

    fn client_for(controller_url: &str) -> PineconeClient {
        PineconeClient::new(PineconeSettings {
            timeout_secs: 5,
            controller_url: Some(controller_url.to_string()),
        })
        .unwrap()
    }

    fn whoami_ok() -> CannedResponse {
        CannedResponse::json(200, r#"{"project_name":"abc123"}"#)
    }

    #[tokio::test]
    async fn test_init_sends_api_key_and_records_project() {
        let (url, server) = serve(vec![whoami_ok()]).await;
        let mut client = client_for(&url);

        client.init("local", "secret").await.unwrap();

        assert_eq!(client.project_name(), Some("abc123"));
        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /actions/whoami "));
        assert!(requests[0].to_lowercase().contains("api-key: secret"));
    }

    #[tokio::test]
    async fn test_init_rejected_key_is_connection_error() {
        for status in [401, 403] {
            let (url, _server) = serve(vec![CannedResponse::json(status, "{}")]).await;
            let mut client = client_for(&url);

            let err = client.init("local", "bad").await.unwrap_err();
            assert!(err.is_connection(), "status {}: {}", status, err);
            assert!(client.project_name().is_none());
        }
    }

    #[tokio::test]
    async fn test_unknown_index_is_connection_error() {
        let (url, server) = serve(vec![whoami_ok(), CannedResponse::json(404, "{}")]).await;
        let mut client = client_for(&url);
        client.init("local", "secret").await.unwrap();

        let err = client.open_index("missing").await.unwrap_err();

        assert!(err.is_connection());
        assert!(err.to_string().contains("Index 'missing' not found"));
        let requests = server.await.unwrap();
        assert!(requests[1].starts_with("GET /databases/missing "));
    }

    #[tokio::test]
    async fn test_index_lookup_forbidden_is_connection_error() {
        let (url, _server) = serve(vec![whoami_ok(), CannedResponse::json(403, "{}")]).await;
        let mut client = client_for(&url);
        client.init("local", "secret").await.unwrap();

        assert!(client.open_index("docs").await.unwrap_err().is_connection());
    }

    #[tokio::test]
    async fn test_reported_host_is_used() {
        let (url, _server) = serve(vec![
            whoami_ok(),
            CannedResponse::json(
                200,
                r#"{"status":{"host":"docs-abc123.svc.example.io","ready":true}}"#,
            ),
        ])
        .await;
        let mut client = client_for(&url);
        client.init("local", "secret").await.unwrap();

        let index = client.open_index("docs").await.unwrap();
        assert_eq!(index.base_url(), "https://docs-abc123.svc.example.io");
        assert_eq!(index.name(), "docs");
    }

    #[tokio::test]
    async fn test_missing_host_falls_back_to_project_host() {
        let (url, _server) = serve(vec![
            whoami_ok(),
            CannedResponse::json(200, r#"{"status":{"ready":false}}"#),
        ])
        .await;
        let mut client = client_for(&url);
        client.init("local", "secret").await.unwrap();

        let index = client.open_index("docs").await.unwrap();
        assert_eq!(index.base_url(), "https://docs-abc123.svc.local.pinecone.io");
    }

    fn index_at(base_url: &str) -> PineconeIndex {
        PineconeIndex {
            client: Client::new(),
            name: "docs".to_string(),
            base_url: base_url.to_string(),
            api_key: "secret".to_string(),
        }
    }

    fn query_request() -> QueryRequest {
        QueryRequest {
            vector: vec![0.5, 0.5],
            sparse_vector: None,
            top_k: 3,
            include_metadata: true,
            include_values: false,
            namespace: None,
        }
    }

    #[tokio::test]
    async fn test_query_returns_matches_in_order() {
        let (url, server) = serve(vec![CannedResponse::json(
            200,
            r#"{"matches":[{"id":"b","score":0.2},{"id":"a","score":0.9}],"namespace":""}"#,
        )])
        .await;

        let response = index_at(&url).query(query_request()).await.unwrap();

        let ids: Vec<&str> = response.matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /query "));
        assert!(requests[0].contains(r#""topK":3"#));
    }

    #[tokio::test]
    async fn test_query_rate_limited() {
        let (url, _server) = serve(vec![
            CannedResponse::json(429, "{}").with_header("retry-after", "2")
        ])
        .await;

        let err = index_at(&url).query(query_request()).await.unwrap_err();
        assert!(matches!(
            err,
            HybridError::RateLimited { retry_after_ms: Some(2000) }
        ));
    }

    #[tokio::test]
    async fn test_query_rate_limited_with_huge_retry_after() {
        let (url, _server) = serve(vec![CannedResponse::json(429, "{}")
            .with_header("retry-after", "18446744073709551615")])
        .await;

        let err = index_at(&url).query(query_request()).await.unwrap_err();
        assert!(matches!(err, HybridError::RateLimited { retry_after_ms: None }));
    }

    #[tokio::test]
    async fn test_query_server_error_is_retrieval_error() {
        let (url, _server) = serve(vec![CannedResponse::json(500, "boom")]).await;

        let err = index_at(&url).query(query_request()).await.unwrap_err();
        assert!(err.is_retrieval());
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_describe_stats() {
        let (url, server) = serve(vec![CannedResponse::json(
            200,
            r#"{"dimension":1536,"indexFullness":0.1,"totalVectorCount":42,"namespaces":{"":{"vectorCount":42}}}"#,
        )])
        .await;

        let stats = index_at(&url).describe_stats().await.unwrap();
        assert_eq!(stats.dimension, 1536);
        assert_eq!(stats.total_vector_count, 42);
        assert_eq!(stats.namespaces[""].vector_count, 42);
        assert!(server.await.unwrap()[0].starts_with("POST /describe_index_stats "));
    }

    #[tokio::test]
    async fn test_index_before_init_is_connection_error() {
        let client = PineconeClient::new(PineconeSettings::default()).unwrap();
        let err = client.index("docs").await.err().unwrap();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_unreachable_controller_is_connection_error() {
        let mut client = PineconeClient::new(PineconeSettings {
            timeout_secs: 2,
            controller_url: Some("http://127.0.0.1:9".to_string()),
        })
        .unwrap();
        let err = client.init("local", "key").await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    #[ignore] // Integration test - requires Pinecone credentials
    async fn test_live_init() {
        let config = crate::config::PineconeConfig::from_env();
        let mut client = PineconeClient::new(PineconeSettings::default()).unwrap();
        client.init(&config.environment, &config.api_key).await.unwrap();
        assert!(client.project_name().is_some());
    }
}
