//! Error types for the coursekb retrieval engine.
//!
//! Every failure bubbles to the immediate caller; the engine performs no
//! internal retries.

use thiserror::Error;

/// Main error type for knowledge-base operations
#[derive(Error, Debug)]
pub enum KbError {
    /// Invalid static configuration (chunk/overlap relationship, missing
    /// backend connection parameters)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The embedding capability errored or returned malformed output
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The vector-search backend errored during upsert or query
    #[error("Index backend error: {0}")]
    IndexBackend(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for knowledge-base operations
pub type Result<T> = std::result::Result<T, KbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = KbError::Config("overlap (300) must be smaller than chunk size (200)".to_string());
        assert!(err.to_string().contains("overlap"));
        assert!(err.to_string().contains("Configuration"));
    }

    #[test]
    fn test_embedding_error_display() {
        let err = KbError::Embedding("HTTP 429: rate limited".to_string());
        assert!(err.to_string().contains("Embedding failed"));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: KbError = io.into();
        assert!(matches!(err, KbError::Io(_)));
    }
}
