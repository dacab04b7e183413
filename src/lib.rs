//! coursekb - Course knowledge-base retrieval engine
//!
//! Turns raw course documents into searchable semantic chunks and answers
//! similarity queries used to ground quiz generation.
//!
//! # Architecture
//!
//! - **chunker**: overlapping fixed-size text windows
//! - **embedding**: pluggable text -> vector capability (remote service)
//! - **index**: vector storage behind one contract, in-memory or Qdrant
//! - **kb**: one-shot corpus build pass (chunk + embed + insert)
//! - **retriever**: ranked top-K search with optional course filtering

pub mod errors;
pub mod config;
pub mod chunker;
pub mod embedding;
pub mod index;
pub mod kb;
pub mod retriever;

pub mod cli;

// Re-export commonly used types
pub use errors::{KbError, Result};
pub use retriever::{RetrievedChunk, Retriever, DEFAULT_TOP_K};
