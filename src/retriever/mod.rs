//! Public query entry point.
//!
//! Embeds the query, delegates to the index with an optional course filter,
//! and returns ranked chunks. Embeddings never leave this module: downstream
//! consumers (quiz generation) only see id, source, text, course, and score.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::Result;
use crate::index::ScoredChunk;
use crate::kb::KnowledgeBase;

/// Default number of results for callers that don't specify one
pub const DEFAULT_TOP_K: usize = 5;

/// A ranked chunk as exposed to consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub id: String,
    pub source: String,
    pub course_id: String,
    pub text: String,
    pub score: f32,
}

impl From<ScoredChunk> for RetrievedChunk {
    fn from(chunk: ScoredChunk) -> Self {
        Self {
            id: chunk.id,
            source: chunk.source,
            course_id: chunk.course_id,
            text: chunk.text,
            score: chunk.score,
        }
    }
}

/// Retrieval front door over a lazily built knowledge base
pub struct Retriever {
    kb: Arc<KnowledgeBase>,
}

impl Retriever {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    /// Return up to `top_k` chunks most similar to `query`, optionally
    /// restricted to one course.
    ///
    /// Triggers the one-time build pass on first use. An unknown course
    /// filter or an empty corpus yields an empty result, not an error.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        course_id: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        self.kb.ensure_built().await?;

        let query_embedding = self.kb.embedder().embed(query).await?;

        let scored = self
            .kb
            .index()
            .query(&query_embedding, top_k, course_id)
            .await?;

        debug!(
            results = scored.len(),
            top_k,
            course = course_id.unwrap_or("<all>"),
            "search completed"
        );

        Ok(scored.into_iter().map(RetrievedChunk::from).collect())
    }
}
