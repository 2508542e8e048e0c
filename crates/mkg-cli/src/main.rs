//! `mkg`: command-line entrypoint for extracting a medical knowledge graph
//! from a clinical PDF, and for querying it via confidence-weighted
//! multi-hop reasoning.

mod config;
mod driver;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mkg_extract::{ApiKeyPool, Extractor, MockBackend};
use mkg_ingest::PdfParser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mkg")]
#[command(author, version, about = "Medical knowledge graph extraction and reasoning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a knowledge graph from a clinical PDF, resuming from any
    /// existing checkpoint in `--checkpoint`.
    Extract {
        /// Path to the source PDF.
        pdf: PathBuf,
        /// Directory holding (or to hold) the checkpoint.
        #[arg(long, default_value = "./checkpoint")]
        checkpoint: PathBuf,
        /// Model name recorded in the checkpoint fingerprint.
        #[arg(long, default_value = "llama3")]
        model: String,
        /// Ollama host, used when built with the `llm-ollama` feature.
        #[arg(long, default_value = "http://localhost:11434")]
        ollama_host: String,
    },
    /// Render a reasoning context for `entity` from a saved checkpoint.
    Reason {
        /// Checkpoint directory to load the graph from.
        checkpoint: PathBuf,
        /// Entity name (raw surface form; normalized before lookup).
        entity: String,
        /// Reasoning depth (1 = direct connections only).
        #[arg(long, default_value_t = 2)]
        depth: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract {
            pdf,
            checkpoint,
            model,
            ollama_host,
        } => extract_command(&pdf, &checkpoint, &model, &ollama_host).await,
        Commands::Reason {
            checkpoint,
            entity,
            depth,
        } => reason_command(&checkpoint, &entity, depth),
    }
}

async fn extract_command(
    pdf: &std::path::Path,
    checkpoint_dir: &std::path::Path,
    model: &str,
    ollama_host: &str,
) -> Result<()> {
    let pipeline_config = config::load_pipeline_config()?;
    let api_keys = config::load_api_keys().unwrap_or_else(|_| vec!["local".to_string()]);
    let mut pool = ApiKeyPool::new(api_keys, pipeline_config.cooldown_secs)?;

    let parser = PdfParser::new()
        .with_chunk_size(pipeline_config.chunk_size)
        .with_overlap(pipeline_config.chunk_overlap);
    let document = parser.parse_file(pdf).map_err(|e| anyhow!("failed to read {}: {e}", pdf.display()))?;
    let chunks = parser.create_chunks(&document);
    println!("{}", format!("Loaded {} chunks from {}", chunks.len(), pdf.display()).bold());

    let document_path = pdf.to_string_lossy().to_string();
    let model_name = model.to_string();

    #[cfg(feature = "llm-ollama")]
    let graph = {
        let host = ollama_host.to_string();
        let model_for_closure = model_name.clone();
        let make_extractor = move |_key: &str| -> Result<Extractor<mkg_extract::OllamaBackend>, mkg_extract::BackendError> {
            Ok(Extractor::new(mkg_extract::OllamaBackend::new(
                host.clone(),
                model_for_closure.clone(),
            )?))
        };
        driver::run_extraction(
            &chunks,
            make_extractor,
            &mut pool,
            checkpoint_dir,
            &document_path,
            &model_name,
            &pipeline_config,
        )
        .await?
    };

    #[cfg(not(feature = "llm-ollama"))]
    let graph = {
        let _ = ollama_host;
        let make_extractor = |_key: &str| {
            Ok(Extractor::new(MockBackend::new(vec![
                "{\"entities\":[],\"relations\":[]}".to_string(),
            ])))
        };
        driver::run_extraction(
            &chunks,
            make_extractor,
            &mut pool,
            checkpoint_dir,
            &document_path,
            &model_name,
            &pipeline_config,
        )
        .await?
    };

    println!(
        "{}",
        format!("Done: {} nodes, {} edges", graph.num_nodes(), graph.num_edges()).green()
    );
    Ok(())
}

fn reason_command(checkpoint_dir: &std::path::Path, entity: &str, depth: u32) -> Result<()> {
    let mgr = mkg_core::CheckpointManager::new(checkpoint_dir)?;
    let (graph, _) = mgr.load()?;
    let graph = graph.ok_or_else(|| anyhow!("no checkpoint found at {}", checkpoint_dir.display()))?;

    let key = mkg_core::normalize(entity);
    let context = mkg_reasoner::render_context(&graph, &key, depth);
    println!("{context}");
    Ok(())
}
