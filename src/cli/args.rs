//! Command-line argument parsing for pinecone-hybrid
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_QUERY: &str = "hello bye";

/// pinecone-hybrid - Hybrid dense + sparse search over a Pinecone index
#[derive(Parser, Debug)]
#[command(name = "pinecone-hybrid")]
#[command(version)]
#[command(about = "Hybrid dense + sparse search over a Pinecone index", long_about = None)]
pub struct Args {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Number of documents to return (overrides the config file)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Dense/sparse fusion weight, 1.0 = pure dense (overrides the config file)
    #[arg(short, long)]
    pub alpha: Option<f32>,

    /// Index namespace (overrides the config file)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except results)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Index documents from a file, one per non-empty line
    Add {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show index statistics
    Stats,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Query to run, falling back to the default greeting query
    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }

    /// Check flag combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() && self.query.is_some() {
            return Err("Cannot specify a query with a subcommand.".to_string());
        }

        if self.quiet && self.verbose > 0 {
            return Err("--quiet and --verbose are mutually exclusive.".to_string());
        }

        if self.top_k == Some(0) {
            return Err("--top-k must be greater than 0.".to_string());
        }

        if let Some(alpha) = self.alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(format!("--alpha must be between 0 and 1, got {}", alpha));
            }
        }

        Ok(())
    }
}

impl Verbosity {
    /// Check if should show the progress spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Log level implied by the flags, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        match self {
            Verbosity::Quiet => Some(tracing::Level::ERROR),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some(tracing::Level::DEBUG),
            Verbosity::VeryVerbose => Some(tracing::Level::TRACE),
        }
    }
}
