//! Tokenizer capability

use crate::errors::Result;

/// Converts text into token ids for sparse-vector construction
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    fn vocab_size(&self) -> usize;
}
