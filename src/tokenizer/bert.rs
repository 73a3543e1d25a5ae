//! WordPiece tokenizer backed by the `tokenizers` crate
//!
//! Loads a `tokenizer.json` either from disk or from the Hugging Face hub.
//! Special tokens are not added: the ids feed term-frequency sparse vectors,
//! where `[CLS]`/`[SEP]` would only add noise.

use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer as HfTokenizer, TruncationParams};
use tracing::{debug, info};

use super::traits::Tokenizer;
use crate::errors::{HybridError, Result};

/// Tokenizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Hub model id used when `vocab_file` is unset
    pub model: String,
    /// Local `tokenizer.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_file: Option<PathBuf>,
    /// Case-fold input before encoding
    pub lowercase: bool,
    /// Maximum number of tokens per encoding
    pub max_length: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            model: "bert-base-uncased".to_string(),
            vocab_file: None,
            lowercase: true,
            max_length: 512,
        }
    }
}

pub struct BertTokenizer {
    inner: HfTokenizer,
    lowercase: bool,
    max_length: usize,
}

impl BertTokenizer {
    /// Load according to `config`; may download from the hub (blocking)
    pub fn load(config: &TokenizerConfig) -> Result<Self> {
        match &config.vocab_file {
            Some(path) => Self::from_file(path, config.lowercase, config.max_length),
            None => Self::from_pretrained(&config.model, config.lowercase, config.max_length),
        }
    }

    pub fn from_file(path: &Path, lowercase: bool, max_length: usize) -> Result<Self> {
        debug!("Loading tokenizer from {}", path.display());
        let inner = HfTokenizer::from_file(path)
            .map_err(|e| HybridError::Tokenizer(format!("Failed to load {}: {}", path.display(), e)))?;
        Self::from_tokenizer(inner, lowercase, max_length)
    }

    pub fn from_pretrained(model_id: &str, lowercase: bool, max_length: usize) -> Result<Self> {
        let api = Api::new()
            .map_err(|e| HybridError::Tokenizer(format!("Failed to create Hugging Face API client: {}", e)))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));
        let path = repo
            .get("tokenizer.json")
            .map_err(|e| HybridError::Tokenizer(format!("Failed to download tokenizer for {}: {}", model_id, e)))?;

        info!("Tokenizer '{}' loaded", model_id);
        Self::from_file(&path, lowercase, max_length)
    }

    pub fn from_tokenizer(mut inner: HfTokenizer, lowercase: bool, max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(HybridError::Configuration(
                "tokenizer max_length must be greater than 0".to_string(),
            ));
        }

        inner
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| HybridError::Tokenizer(format!("Failed to configure truncation: {}", e)))?;

        Ok(Self {
            inner,
            lowercase,
            max_length,
        })
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Tokenizer for BertTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let input = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let encoding = self
            .inner
            .encode(input, false)
            .map_err(|e| HybridError::Tokenizer(format!("Tokenization failed: {}", e)))?;

        Ok(encoding.get_ids().to_vec())
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}
