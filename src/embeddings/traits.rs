//! Text embedding capability

use async_trait::async_trait;

use crate::errors::Result;

/// Turns text into fixed-dimension dense vectors.
///
/// Object-safe so the retriever can hold an `Arc<dyn TextEmbedder>`.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of documents, one vector per input, in input order.
    ///
    /// The default implementation embeds each text separately.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_query(text).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize;

    /// Provider name, e.g. "openai"
    fn name(&self) -> &str;
}
