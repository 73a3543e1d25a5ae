//! Dense embeddings
pub mod openai;
pub mod traits;

pub use openai::{EmbeddingsConfig, OpenAIEmbeddings, ENV_OPENAI_API_KEY};
pub use traits::TextEmbedder;
