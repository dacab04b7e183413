//! coursekb - CLI entry point and composition root

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use coursekb::{
    cli::{Args, Commands},
    config::{IndexBackend, KbConfig},
    embedding::{Embedder, HttpEmbedder},
    index::{MemoryIndex, QdrantIndex, VectorIndex},
    kb::KnowledgeBase,
    retriever::Retriever,
    KbError,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = KbConfig::load()?;
    if let Some(root) = args.corpus_root {
        config.corpus_root = root;
    }
    config.validate()?;

    match args.command {
        Commands::Build => {
            let retriever = init_retriever(&config).await?;
            let stats = retriever.knowledge_base().ensure_built().await?;

            println!(
                "{} {} courses, {} files, {} chunks",
                "Indexed:".green().bold(),
                stats.courses,
                stats.files,
                stats.chunks
            );
        }

        Commands::Search { query, course, top_k } => {
            let retriever = init_retriever(&config).await?;
            let chunks = retriever.search(&query, top_k, course.as_deref()).await?;

            if chunks.is_empty() {
                println!("{}", "No matching chunks found.".yellow());
                return Ok(());
            }

            for (rank, chunk) in chunks.iter().enumerate() {
                println!(
                    "{} {} {} {}",
                    format!("{}.", rank + 1).bold(),
                    chunk.id.cyan(),
                    format!("[{}]", chunk.course_id).blue(),
                    format!("score={:.4}", chunk.score).dimmed()
                );
                println!("   {}\n", chunk.text.trim().lines().next().unwrap_or(""));
            }
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Wire the configured backend, embedder, and knowledge base together
async fn init_retriever(config: &KbConfig) -> Result<Retriever> {
    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(&config.embedding)?);

    let index: Arc<dyn VectorIndex> = match config.index.backend {
        IndexBackend::Memory => Arc::new(MemoryIndex::new()),
        IndexBackend::Qdrant => {
            let qdrant = config
                .index
                .qdrant
                .as_ref()
                .ok_or_else(|| KbError::Config("missing [index.qdrant] configuration".to_string()))?;
            Arc::new(QdrantIndex::new(qdrant, config.embedding.dimension).await?)
        }
    };

    let kb = Arc::new(KnowledgeBase::new(
        index,
        embedder,
        config.corpus_root.clone(),
        config.chunking.clone(),
        config.embedding.concurrency,
    ));

    Ok(Retriever::new(kb))
}
