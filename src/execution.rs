//! Shared query execution for the binary and tests
//!
//! Output is written only after retrieval succeeds, so a failed query leaves
//! the writer untouched.

use std::io::Write;
use tracing::debug;

use crate::display_mode::DisplayMode;
use crate::errors::Result;
use crate::retriever::{Document, Retriever};

/// Run one query and render the results
pub async fn run_query(
    retriever: &dyn Retriever,
    query: &str,
    display_mode: DisplayMode,
    out: &mut dyn Write,
) -> Result<Vec<Document>> {
    debug!("Running query: {:?}", query);
    let documents = retriever.get_relevant_documents(query).await?;

    display_mode.write_documents(out, &documents)?;
    out.flush()?;

    Ok(documents)
}
