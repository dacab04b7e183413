//! Text-embedding capability boundary.
//!
//! The engine never computes embeddings itself; it depends on this trait
//! being supplied by the composition root. The production implementation
//! talks to an OpenAI-compatible embeddings API.

use async_trait::async_trait;

use crate::errors::Result;

pub mod client;

pub use client::HttpEmbedder;

/// Maps text to a fixed-dimension vector.
///
/// The dimension is fixed for the lifetime of an index; a failing capability
/// surfaces its error rather than substituting a degenerate vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed multiple texts in one request where the backend supports it
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Fixed output dimensionality
    fn dimension(&self) -> usize;
}
