//! Vector index contract and chunk storage types.
//!
//! Two interchangeable backends live behind [`VectorIndex`]: an in-memory
//! full-scan index and a remote Qdrant collection. Callers only ever see the
//! trait object, so the retrieval path is agnostic to where vectors live.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub mod memory;
pub mod qdrant;

pub use memory::MemoryIndex;
pub use qdrant::QdrantIndex;

/// A chunk ready for insertion: text, grouping metadata, and its embedding.
///
/// Write-once: chunks are created during the build pass and never mutated
/// afterward. The id is deterministic from (course, source, ordinal) so
/// re-indexing the same corpus reproduces identical ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub id: String,
    pub source: String,
    pub course_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// An index query hit, ranked by similarity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: String,
    pub source: String,
    pub course_id: String,
    pub text: String,
    pub score: f32,
}

/// Storage backend for chunks and their embeddings.
///
/// `upsert` is only called during the single-writer build pass; `query` must
/// be safe under concurrent readers once the build completes.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert a batch of embedded chunks
    async fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> Result<()>;

    /// Return up to `top_k` chunks ranked by descending similarity to
    /// `vector`, optionally restricted to a single course
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        course_id: Option<&str>,
    ) -> Result<Vec<ScoredChunk>>;
}
