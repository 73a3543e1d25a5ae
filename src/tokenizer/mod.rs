//! Tokenization for sparse vectors
pub mod bert;
pub mod traits;

pub use bert::{BertTokenizer, TokenizerConfig};
pub use traits::Tokenizer;
