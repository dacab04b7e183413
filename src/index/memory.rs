//! In-memory vector index: brute-force cosine scan.
//!
//! Queries compare against every stored vector, O(n) per query. That is the
//! contract, not a shortcut: the corpus is demo-scale and the scan is
//! inherently reentrant once the build pass is done.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{KbError, Result};

use super::{EmbeddedChunk, ScoredChunk, VectorIndex};

/// Guards the norm against division by zero on degenerate all-zero vectors
const NORM_EPSILON: f32 = 1e-8;

/// Full-scan cosine similarity index
#[derive(Default)]
pub struct MemoryIndex {
    chunks: RwLock<Vec<EmbeddedChunk>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks currently stored
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

/// Cosine similarity: dot product over the product of L2 norms
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / ((norm_a + NORM_EPSILON) * (norm_b + NORM_EPSILON))
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> Result<()> {
        let mut store = self.chunks.write().await;
        for chunk in chunks {
            // Replace-by-id keeps a retried build pass from duplicating
            // chunks; the original insertion position is preserved.
            match store.iter_mut().find(|existing| existing.id == chunk.id) {
                Some(existing) => *existing = chunk,
                None => store.push(chunk),
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        course_id: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let store = self.chunks.read().await;

        // Candidates are collected in insertion order; the stable sort below
        // keeps that order for equal scores.
        let mut scored = Vec::new();
        for chunk in store
            .iter()
            .filter(|chunk| course_id.map_or(true, |c| chunk.course_id == c))
        {
            if chunk.embedding.len() != vector.len() {
                return Err(KbError::Config(format!(
                    "query vector dimension mismatch: index holds {}, query has {}",
                    chunk.embedding.len(),
                    vector.len()
                )));
            }

            scored.push(ScoredChunk {
                id: chunk.id.clone(),
                source: chunk.source.clone(),
                course_id: chunk.course_id.clone(),
                text: chunk.text.clone(),
                score: cosine_similarity(vector, &chunk.embedding),
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }
}
