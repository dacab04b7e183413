//! Command-line argument parsing for coursekb

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::retriever::DEFAULT_TOP_K;

/// coursekb - semantic retrieval over per-course document collections
#[derive(Parser, Debug)]
#[command(name = "coursekb")]
#[command(version)]
#[command(about = "Build and query a course knowledge base", long_about = None)]
pub struct Args {
    /// Corpus root directory (overrides configuration)
    #[arg(long)]
    pub corpus_root: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk, embed, and index the corpus
    Build,

    /// Query the knowledge base for the most similar chunks
    Search {
        /// Query text (a lecture transcript or portion of it)
        query: String,

        /// Restrict results to one course
        #[arg(short, long)]
        course: Option<String>,

        /// Maximum number of results
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Display the effective configuration
    Config,
}
