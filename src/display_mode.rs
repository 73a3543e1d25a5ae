//! Output rendering for retrieval results
//!
//! Results go to the writer handed in (stdout in the binary); diagnostics go
//! through `tracing` to stderr.

use colored::Colorize;
use std::io::Write;

use crate::errors::Result;
use crate::retriever::Document;
use crate::vector_db::IndexStats;

/// Longest content preview printed in text mode, in characters
const PREVIEW_CHARS: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Human-readable, colored listing
    Text,
    /// Pretty-printed JSON array
    Json,
}

impl DisplayMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn write_documents(&self, out: &mut dyn Write, documents: &[Document]) -> Result<()> {
        match self {
            Self::Json => {
                serde_json::to_writer_pretty(&mut *out, documents)?;
                writeln!(out)?;
            }
            Self::Text => {
                if documents.is_empty() {
                    writeln!(out, "{}", "No matching documents.".dimmed())?;
                    return Ok(());
                }

                for (rank, doc) in documents.iter().enumerate() {
                    writeln!(
                        out,
                        "{} {} {}",
                        format!("{}.", rank + 1).bold(),
                        doc.id.cyan(),
                        format!("(score {:.4})", doc.score).dimmed()
                    )?;
                    writeln!(out, "   {}", preview(&doc.page_content))?;
                    if !doc.metadata.is_empty() {
                        let metadata = serde_json::Value::Object(doc.metadata.clone());
                        writeln!(out, "   {}", metadata.to_string().dimmed())?;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn write_stats(&self, out: &mut dyn Write, index: &str, stats: &IndexStats) -> Result<()> {
        match self {
            Self::Json => {
                serde_json::to_writer_pretty(&mut *out, stats)?;
                writeln!(out)?;
            }
            Self::Text => {
                writeln!(out, "{} {}", "Index:".bold(), index)?;
                writeln!(out, "  Dimension:      {}", stats.dimension)?;
                writeln!(out, "  Total vectors:  {}", stats.total_vector_count)?;
                writeln!(out, "  Fullness:       {:.2}%", stats.index_fullness * 100.0)?;

                let mut namespaces: Vec<_> = stats.namespaces.iter().collect();
                namespaces.sort_by(|a, b| a.0.cmp(b.0));
                for (name, summary) in namespaces {
                    let label = if name.is_empty() { "(default)" } else { name.as_str() };
                    writeln!(out, "  {:<16}{}", label, summary.vector_count)?;
                }
            }
        }

        Ok(())
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn doc(id: &str, content: &str) -> Document {
        Document {
            id: id.to_string(),
            page_content: content.to_string(),
            metadata: Map::new(),
            score: 0.5,
        }
    }

    #[test]
    fn test_json_output_parses_back() {
        let mut out = Vec::new();
        DisplayMode::Json
            .write_documents(&mut out, &[doc("a", "hello"), doc("b", "bye")])
            .unwrap();

        let parsed: Vec<Document> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].id, "b");
    }

    #[test]
    fn test_text_output_keeps_order() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        DisplayMode::Text
            .write_documents(&mut out, &[doc("first", "hello"), doc("second", "bye")])
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        assert!(first < second);
        assert!(text.contains("1. first"));
    }

    #[test]
    fn test_text_output_empty() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        DisplayMode::Text.write_documents(&mut out, &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No matching documents"));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "word ".repeat(200);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 1);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn test_from_json_flag() {
        assert_eq!(DisplayMode::from_json_flag(true), DisplayMode::Json);
        assert_eq!(DisplayMode::from_json_flag(false), DisplayMode::Text);
    }
}
