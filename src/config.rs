//! Connection settings for the vector database
//!
//! `PineconeConfig` is built once at the process boundary (see `from_env`) and
//! passed down by reference. Nothing below `main` reads the environment.

use serde::{Deserialize, Serialize};

use crate::errors::{HybridError, Result};

pub const ENV_ENVIRONMENT: &str = "PINECONE_ENVIRONMENT";
pub const ENV_API_KEY: &str = "PINECONE_API_KEY";
pub const ENV_INDEX: &str = "PINECONE_INDEX";

/// Credentials and index name for the vector database
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PineconeConfig {
    pub environment: String,
    pub api_key: String,
    pub index: String,
}

impl PineconeConfig {
    pub fn new(
        environment: impl Into<String>,
        api_key: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            api_key: api_key.into(),
            index: index.into(),
        }
    }

    /// Read the three required variables from the process environment.
    ///
    /// Absent variables become empty strings; `validate` reports them.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            environment: lookup(ENV_ENVIRONMENT).unwrap_or_default(),
            api_key: lookup(ENV_API_KEY).unwrap_or_default(),
            index: lookup(ENV_INDEX).unwrap_or_default(),
        }
    }

    /// Every value must be present and non-blank
    pub fn validate(&self) -> Result<()> {
        let required = [
            (ENV_ENVIRONMENT, &self.environment),
            (ENV_API_KEY, &self.api_key),
            (ENV_INDEX, &self.index),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(HybridError::Configuration(format!(
                "missing required value(s): {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("environment", &self.environment)
            .field("api_key", &self.masked_api_key())
            .field("index", &self.index)
            .finish()
    }
}

pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
