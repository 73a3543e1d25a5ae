//! Error types for pinecone-hybrid
//!
//! Every external call (Pinecone controller, Pinecone data plane, embeddings
//! API, tokenizer) is wrapped in a `Result` carrying one of these kinds.

use thiserror::Error;

/// Main error type for the hybrid retriever
#[derive(Error, Debug)]
pub enum HybridError {
    /// A required configuration value is absent or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The database service rejected the credentials or the index lookup
    #[error("Connection error: {0}")]
    Connection(String),

    /// The retrieval query failed
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Embeddings API errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Rate limited by an upstream API
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Tokenizer loading or encoding errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HybridError {
    /// Re-classify any failure raised while serving a query as a retrieval error.
    ///
    /// Configuration errors are kept as-is so that invalid parameters stay
    /// distinguishable from service failures.
    pub fn into_retrieval(self) -> Self {
        match self {
            err @ (HybridError::Retrieval(_) | HybridError::Configuration(_)) => err,
            other => HybridError::Retrieval(other.to_string()),
        }
    }

    /// Build a `RateLimited` error from a 429 response's headers
    pub fn rate_limited(headers: &reqwest::header::HeaderMap) -> Self {
        let retry_after_ms = headers
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_ms);
        HybridError::RateLimited { retry_after_ms }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, HybridError::Configuration(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, HybridError::Connection(_))
    }

    pub fn is_retrieval(&self) -> bool {
        matches!(self, HybridError::Retrieval(_))
    }
}

/// `Retry-After` delay-seconds as milliseconds; `None` when unparsable or too large
pub fn parse_retry_after_ms(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()?.checked_mul(1000)
}

/// Result type alias for retriever operations
pub type Result<T> = std::result::Result<T, HybridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HybridError::Configuration("PINECONE_INDEX is empty".to_string());
        assert!(err.to_string().contains("PINECONE_INDEX"));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_into_retrieval_wraps_service_failures() {
        let err = HybridError::Embedding("upstream 500".to_string()).into_retrieval();
        assert!(err.is_retrieval());
        assert!(err.to_string().contains("upstream 500"));
    }

    #[test]
    fn test_into_retrieval_keeps_configuration() {
        let err = HybridError::Configuration("alpha".to_string()).into_retrieval();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after_ms("2"), Some(2000));
        assert_eq!(parse_retry_after_ms(" 30 "), Some(30_000));
        assert_eq!(parse_retry_after_ms("18446744073709551615"), None);
        assert_eq!(parse_retry_after_ms("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after_ms(""), None);
    }

    #[test]
    fn test_rate_limited_from_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::RETRY_AFTER,
            reqwest::header::HeaderValue::from_static("18446744073709551615"),
        );
        assert!(matches!(
            HybridError::rate_limited(&headers),
            HybridError::RateLimited { retry_after_ms: None }
        ));

        headers.insert(
            reqwest::header::RETRY_AFTER,
            reqwest::header::HeaderValue::from_static("3"),
        );
        assert!(matches!(
            HybridError::rate_limited(&headers),
            HybridError::RateLimited { retry_after_ms: Some(3000) }
        ));
    }

    #[test]
    fn test_rate_limited_display() {
        let err = HybridError::RateLimited { retry_after_ms: Some(2000) };
        assert!(err.to_string().contains("2000"));
    }
}
