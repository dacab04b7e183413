//! Knowledge-base builder: the one-time corpus pass.
//!
//! Walks a two-level corpus (course directory -> plain-text documents),
//! chunks and embeds each document, and populates the vector index. The
//! pass runs exactly once per process no matter how many queries race to
//! trigger it; rebuilding requires a fresh process.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::chunker::ChunkWindows;
use crate::config::ChunkingConfig;
use crate::embedding::Embedder;
use crate::errors::{KbError, Result};
use crate::index::{EmbeddedChunk, VectorIndex};

/// Counters from the build pass
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BuildStats {
    pub courses: usize,
    pub files: usize,
    pub chunks: usize,
}

/// Owns the index, the embedding capability, and the build-once lifecycle
pub struct KnowledgeBase {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    corpus_root: PathBuf,
    chunking: ChunkingConfig,
    embed_concurrency: usize,
    built: OnceCell<BuildStats>,
}

impl KnowledgeBase {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        corpus_root: PathBuf,
        chunking: ChunkingConfig,
        embed_concurrency: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            corpus_root,
            chunking,
            embed_concurrency,
            built: OnceCell::new(),
        }
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Run the build pass if it has not run yet.
    ///
    /// Safe under concurrent first calls: exactly one caller performs the
    /// scan while the others wait for its outcome. The built flag is only
    /// set after every insert completed; a failed build surfaces its error
    /// to all waiters without marking the knowledge base as built.
    pub async fn ensure_built(&self) -> Result<&BuildStats> {
        self.built.get_or_try_init(|| self.build()).await
    }

    async fn build(&self) -> Result<BuildStats> {
        let mut stats = BuildStats::default();

        if !self.corpus_root.is_dir() {
            info!(root = %self.corpus_root.display(), "no corpus directory, building empty knowledge base");
            return Ok(stats);
        }

        info!(root = %self.corpus_root.display(), "building knowledge base");

        for course_dir in sorted_entries(&self.corpus_root)? {
            // Stray files at the corpus root are excluded by contract
            if !course_dir.is_dir() {
                continue;
            }

            let course_id = match course_dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            let mut course_files = 0;
            for path in sorted_entries(&course_dir)? {
                if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                    continue;
                }

                let inserted = self.index_document(&course_id, &path).await?;
                course_files += 1;
                stats.files += 1;
                stats.chunks += inserted;
            }

            if course_files > 0 {
                stats.courses += 1;
            }
        }

        info!(
            courses = stats.courses,
            files = stats.files,
            chunks = stats.chunks,
            "knowledge base built"
        );

        Ok(stats)
    }

    /// Chunk, embed, and insert a single document; returns the chunk count.
    ///
    /// A single embedding failure aborts the whole document before anything
    /// is inserted, so the index never holds a partially committed document.
    async fn index_document(&self, course_id: &str, path: &Path) -> Result<usize> {
        let full_text = tokio::fs::read_to_string(path).await?;

        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let windows: Vec<(usize, String)> = ChunkWindows::new(
            &full_text,
            self.chunking.chunk_size,
            self.chunking.overlap,
            self.chunking.max_chunks_per_file,
        )?
        .map(|(_, text)| text.to_string())
        .enumerate()
        .collect();

        if windows.is_empty() {
            debug!(source = %source, course = %course_id, "document produced no chunks");
            return Ok(0);
        }

        // Embedding calls run concurrently and finish in arbitrary order;
        // re-sorting by ordinal keeps insertion order deterministic.
        let mut embedded: Vec<(usize, EmbeddedChunk)> = stream::iter(windows)
            .map(|(ordinal, text)| {
                let embedder = Arc::clone(&self.embedder);
                let id = format!("{}-{}-chunk-{}", course_id, source, ordinal);
                let source = source.clone();
                let course_id = course_id.to_string();

                async move {
                    let embedding = embedder.embed(&text).await?;
                    Ok::<_, KbError>((
                        ordinal,
                        EmbeddedChunk {
                            id,
                            source,
                            course_id,
                            text,
                            embedding,
                        },
                    ))
                }
            })
            .buffer_unordered(self.embed_concurrency)
            .try_collect()
            .await?;
        embedded.sort_by_key(|(ordinal, _)| *ordinal);

        let embedded: Vec<EmbeddedChunk> = embedded.into_iter().map(|(_, chunk)| chunk).collect();
        let count = embedded.len();
        self.index.upsert(embedded).await?;

        debug!(source = %source, course = %course_id, chunks = count, "indexed document");

        Ok(count)
    }
}

/// Directory entries sorted by name, for deterministic build order
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}
