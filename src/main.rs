//! pinecone-hybrid - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pinecone_hybrid::{
    bootstrap::{self, EXIT_CODE_SETUP_NEEDED},
    cli::{Args, Commands, Config, Verbosity},
    config::{mask_secret, PineconeConfig},
    embeddings::{EmbeddingsConfig, OpenAIEmbeddings, ENV_OPENAI_API_KEY},
    execution::run_query,
    retriever::HybridRetriever,
    tokenizer::{BertTokenizer, Tokenizer},
    vector_db::{PineconeClient, VectorIndex},
    DisplayMode,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Err(e) = args.validate() {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }

    let mut config = Config::load(args.config.clone())?;
    config.apply_overrides(args.top_k, args.alpha, args.namespace.clone());

    init_logging(args.verbosity(), &config)?;

    if args.command == Some(Commands::Config) {
        return show_config(&config, args.config.as_deref());
    }

    // Secrets are read here, once, and passed down
    let pinecone = PineconeConfig::from_env();
    if let Err(e) = pinecone.validate() {
        bootstrap::show_setup_instructions(&e);
        std::process::exit(EXIT_CODE_SETUP_NEEDED);
    }

    let mut client = PineconeClient::new(config.pinecone.clone())?;
    let index = bootstrap::bootstrap(&pinecone, &mut client)
        .await
        .context("Failed to connect to Pinecone")?;

    let display_mode = DisplayMode::from_json_flag(args.json);

    if args.command == Some(Commands::Stats) {
        let stats = index.describe_stats().await.context("Failed to fetch index stats")?;
        display_mode.write_stats(&mut std::io::stdout(), index.name(), &stats)?;
        return Ok(());
    }

    let retriever = build_retriever(&config, index).await?;

    match &args.command {
        Some(Commands::Add { file }) => {
            let contents = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let texts: Vec<String> = contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();

            let ids = retriever
                .add_texts(texts, None)
                .await
                .context("Failed to index documents")?;
            println!("{} Indexed {} documents", "✓".green(), ids.len());
        }
        _ => {
            let spinner = start_spinner(args.verbosity(), args.json);
            let mut stdout = std::io::stdout();
            let result = run_query(&retriever, args.query_text(), display_mode, &mut stdout).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            result.context("Retrieval failed")?;
        }
    }

    Ok(())
}

fn init_logging(verbosity: Verbosity, config: &Config) -> Result<()> {
    let level = match verbosity.log_level() {
        Some(level) => level,
        None => config.logging.max_level()?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    Ok(())
}

async fn build_retriever(config: &Config, index: Arc<dyn VectorIndex>) -> Result<HybridRetriever> {
    let embeddings = OpenAIEmbeddings::new(EmbeddingsConfig {
        api_key: std::env::var(ENV_OPENAI_API_KEY).ok(),
        ..config.embeddings.clone()
    })?;

    let tokenizer_config = config.tokenizer.clone();
    let tokenizer = tokio::task::spawn_blocking(move || BertTokenizer::load(&tokenizer_config))
        .await
        .context("Tokenizer loading task failed")??;
    info!(
        "Tokenizer ready: vocab={}, lowercase={}, max_length={}",
        tokenizer.vocab_size(),
        tokenizer.lowercase(),
        tokenizer.max_length()
    );

    Ok(HybridRetriever::from_config(
        Arc::new(embeddings),
        index,
        Arc::new(tokenizer),
        &config.retriever,
    ))
}

fn start_spinner(verbosity: Verbosity, json: bool) -> Option<ProgressBar> {
    if json || !verbosity.show_progress() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Searching...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn show_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let pinecone = PineconeConfig::from_env();
    let openai_key = std::env::var(ENV_OPENAI_API_KEY).unwrap_or_default();

    println!("{}", "Environment".bold());
    println!("  PINECONE_ENVIRONMENT = {}", pinecone.environment);
    println!("  PINECONE_API_KEY     = {}", pinecone.masked_api_key());
    println!("  PINECONE_INDEX       = {}", pinecone.index);
    println!("  OPENAI_API_KEY       = {}", mask_secret(&openai_key));
    println!();

    let source = path
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .filter(|p| p.exists())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    println!("{} ({})", "Configuration".bold(), source);
    print!(
        "{}",
        toml::to_string_pretty(config).context("Failed to serialize config")?
    );

    Ok(())
}
