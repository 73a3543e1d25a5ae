//! Client bootstrap
//!
//! Validates connection settings, initializes the database client and
//! resolves the configured index.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::PineconeConfig;
use crate::errors::{HybridError, Result};
use crate::vector_db::{DatabaseClient, VectorIndex};

/// Exit code when required configuration is missing
pub const EXIT_CODE_SETUP_NEEDED: i32 = 2;

/// Produce a ready-to-use index handle.
///
/// Configuration is checked before any network call. The client is
/// initialized exactly once, and the index is only looked up after a
/// successful init. Service failures surface as `HybridError::Connection`.
pub async fn bootstrap<C>(config: &PineconeConfig, client: &mut C) -> Result<Arc<dyn VectorIndex>>
where
    C: DatabaseClient + ?Sized,
{
    config.validate()?;

    debug!("Initializing database client for {}", config.environment);
    client
        .init(&config.environment, &config.api_key)
        .await
        .map_err(into_connection)?;

    let index = client.index(&config.index).await.map_err(into_connection)?;
    info!("Index '{}' ready", index.name());

    Ok(index)
}

fn into_connection(err: HybridError) -> HybridError {
    match err {
        err @ (HybridError::Connection(_) | HybridError::Configuration(_)) => err,
        other => HybridError::Connection(other.to_string()),
    }
}

/// Print setup instructions for missing configuration
pub fn show_setup_instructions(err: &HybridError) {
    eprintln!("\n❌ {}", err);
    eprintln!("\nThe following environment variables are required:");
    eprintln!("   PINECONE_ENVIRONMENT   e.g. us-west1-gcp");
    eprintln!("   PINECONE_API_KEY       your Pinecone API key");
    eprintln!("   PINECONE_INDEX         name of the index to query");
    eprintln!("\nThe embeddings provider additionally reads OPENAI_API_KEY.");
    eprintln!();
}
