//! Configuration management for pinecone-hybrid
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.pinecone-hybrid/config.toml
//!
//! Secrets are never part of this file; they come from the environment.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embeddings::EmbeddingsConfig;
use crate::retriever::RetrieverConfig;
use crate::tokenizer::TokenizerConfig;
use crate::vector_db::PineconeSettings;

/// Complete configuration for pinecone-hybrid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retriever: RetrieverConfig,
    pub tokenizer: TokenizerConfig,
    pub embeddings: EmbeddingsConfig,
    pub pinecone: PineconeSettings,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn max_level(&self) -> Result<tracing::Level> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow::anyhow!("Invalid log level: {}", self.level))
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the standard location, or built-in defaults when absent
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pinecone-hybrid").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retriever.top_k == 0 {
            bail!("retriever.top_k must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.retriever.alpha) {
            bail!("retriever.alpha must be between 0.0 and 1.0");
        }

        if self.retriever.text_key.trim().is_empty() {
            bail!("retriever.text_key must not be empty");
        }

        if self.tokenizer.max_length == 0 {
            bail!("tokenizer.max_length must be greater than 0");
        }

        if self.embeddings.batch_size == 0 {
            bail!("embeddings.batch_size must be greater than 0");
        }

        self.logging.max_level()?;

        Ok(())
    }

    /// Apply command-line overrides
    pub fn apply_overrides(
        &mut self,
        top_k: Option<usize>,
        alpha: Option<f32>,
        namespace: Option<String>,
    ) {
        if let Some(top_k) = top_k {
            self.retriever.top_k = top_k;
        }
        if let Some(alpha) = alpha {
            self.retriever.alpha = alpha;
        }
        if namespace.is_some() {
            self.retriever.namespace = namespace;
        }
    }
}
