use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vector_db::ScoredVector;

/// Metadata key holding the document text, unless configured otherwise
pub const DEFAULT_TEXT_KEY: &str = "context";

/// Retrieved document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub page_content: String,
    pub metadata: Map<String, Value>,
    pub score: f32,
}

impl Document {
    /// Build from a query match, lifting `text_key` out of the metadata.
    ///
    /// A missing or non-string text entry yields empty content and leaves the
    /// metadata untouched.
    pub fn from_match(scored: ScoredVector, text_key: &str) -> Self {
        let mut metadata = scored.metadata.unwrap_or_default();
        let page_content = match metadata.remove(text_key) {
            Some(Value::String(text)) => text,
            Some(other) => {
                metadata.insert(text_key.to_string(), other);
                String::new()
            }
            None => String::new(),
        };

        Self {
            id: scored.id,
            page_content,
            metadata,
            score: scored.score,
        }
    }
}
