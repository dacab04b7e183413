//! Static configuration for the retrieval engine.
//!
//! Loaded once per process from a TOML file with environment overrides.
//! Invalid configuration is fatal at startup, never discovered at query time.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::errors::{KbError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbConfig {
    #[serde(default = "default_corpus_root")]
    pub corpus_root: PathBuf,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Chunking parameters, tuned for a small demo corpus: bigger chunks mean
/// fewer embedding calls, a small overlap keeps continuity across windows,
/// and the per-file cap bounds embedding cost on large documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub max_chunks_per_file: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            overlap: 200,
            max_chunks_per_file: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings API
    pub endpoint: String,
    pub model: String,
    /// Fixed dimensionality for the lifetime of the index
    pub dimension: usize,
    pub api_key: Option<String>,
    /// Concurrent embedding requests during the build pass
    pub concurrency: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            api_key: None,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,
    pub qdrant: Option<QdrantConfig>,
}

/// Which vector index implementation serves queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Memory,
    Qdrant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
}

fn default_corpus_root() -> PathBuf {
    PathBuf::from("knowledge_base")
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            corpus_root: default_corpus_root(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl KbConfig {
    /// Load configuration from file, falling back to defaults if it doesn't
    /// exist, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            toml::from_str(&contents)
                .map_err(|e| KbError::Config(format!("failed to parse config file: {}", e)))?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| KbError::Config("could not determine home directory".to_string()))?;

        Ok(home.join(".coursekb").join("config.toml"))
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("COURSEKB_API_KEY") {
            self.embedding.api_key = Some(key);
        }
        if let Ok(root) = std::env::var("COURSEKB_CORPUS_ROOT") {
            self.corpus_root = PathBuf::from(root);
        }
        if let Ok(url) = std::env::var("COURSEKB_QDRANT_URL") {
            let qdrant = self.index.qdrant.get_or_insert(QdrantConfig {
                url: String::new(),
                collection: "coursekb".to_string(),
                api_key: None,
            });
            qdrant.url = url;
        }
        if let Ok(key) = std::env::var("COURSEKB_QDRANT_API_KEY") {
            if let Some(qdrant) = self.index.qdrant.as_mut() {
                qdrant.api_key = Some(key);
            }
        }
        self
    }

    /// Validate the configuration, failing fast on anything that would
    /// otherwise surface mid-build or mid-query
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(KbError::Config("chunk_size must be greater than zero".to_string()));
        }

        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(KbError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }

        if self.embedding.dimension == 0 {
            return Err(KbError::Config("embedding dimension must be greater than zero".to_string()));
        }

        if self.embedding.concurrency == 0 {
            return Err(KbError::Config("embedding concurrency must be greater than zero".to_string()));
        }

        if self.index.backend == IndexBackend::Qdrant {
            let qdrant = self.index.qdrant.as_ref().ok_or_else(|| {
                KbError::Config("index backend is 'qdrant' but [index.qdrant] is not set".to_string())
            })?;

            if qdrant.url.is_empty() {
                return Err(KbError::Config("qdrant url must not be empty".to_string()));
            }
            if qdrant.collection.is_empty() {
                return Err(KbError::Config("qdrant collection must not be empty".to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = KbConfig::default();
        assert_eq!(config.corpus_root, PathBuf::from("knowledge_base"));
        assert_eq!(config.chunking.chunk_size, 1500);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.chunking.max_chunks_per_file, 10);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.index.backend, IndexBackend::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut config = KbConfig::default();
        config.chunking.chunk_size = 200;
        config.chunking.overlap = 200;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, KbError::Config(_)));
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_qdrant_backend_requires_connection_params() {
        let mut config = KbConfig::default();
        config.index.backend = IndexBackend::Qdrant;

        assert!(config.validate().is_err());

        config.index.qdrant = Some(QdrantConfig {
            url: "http://localhost:6334".to_string(),
            collection: "coursekb".to_string(),
            api_key: None,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = KbConfig::default();

        let toml_string = toml::to_string(&config).unwrap();
        assert!(toml_string.contains("text-embedding-3-small"));

        let deserialized: KbConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(deserialized.chunking.chunk_size, config.chunking.chunk_size);
        assert_eq!(deserialized.index.backend, IndexBackend::Memory);
    }

    #[test]
    fn test_backend_parses_lowercase() {
        let config: KbConfig = toml::from_str(
            r#"
            [index]
            backend = "qdrant"

            [index.qdrant]
            url = "http://localhost:6334"
            collection = "kb"
            "#,
        )
        .unwrap();
        assert_eq!(config.index.backend, IndexBackend::Qdrant);
    }
}
