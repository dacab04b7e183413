//! HTTP embedding client for OpenAI-compatible APIs.
//!
//! Endpoint: POST {base}/embeddings with a model id and one or more inputs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::errors::{KbError, Result};

use super::Embedder;

/// Request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedding client backed by a remote OpenAI-compatible service
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create an embedder from configuration
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(KbError::Http)?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            dimension: config.dimension,
        })
    }

    async fn request_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts.to_vec(),
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| KbError::Embedding(format!("failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(KbError::Embedding(format!("HTTP {}: {}", status, error_text)));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| KbError::Embedding(format!("malformed response: {}", e)))?;

        parse_embeddings(body, texts.len(), self.dimension)
    }
}

/// Order the response by input index and verify count and dimensionality
fn parse_embeddings(
    mut body: EmbeddingsResponse,
    expected_count: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>> {
    if body.data.len() != expected_count {
        return Err(KbError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected_count,
            body.data.len()
        )));
    }

    body.data.sort_by_key(|d| d.index);

    let mut vectors = Vec::with_capacity(body.data.len());
    for data in body.data {
        if data.embedding.len() != dimension {
            return Err(KbError::Embedding(format!(
                "embedding dimension mismatch: expected {}, got {}",
                dimension,
                data.embedding.len()
            )));
        }
        vectors.push(data.embedding);
    }

    Ok(vectors)
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request_embeddings(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| KbError::Embedding("empty response for single input".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
