//! Remote vector index backed by a Qdrant collection.
//!
//! Insertion and similarity search are delegated to the service; course
//! filtering uses Qdrant's native keyword match on the `course_id` payload
//! field. Point ids are UUIDv5 of the chunk id, so re-indexing the same
//! corpus upserts the same points instead of duplicating them.

use async_trait::async_trait;
use qdrant_client::{
    client::QdrantClient,
    qdrant::{
        vectors_config::Config, with_payload_selector::SelectorOptions, Condition, CreateCollection,
        Distance, FieldCondition, Filter, Match, PointStruct, SearchPoints, Value as QdrantValue,
        VectorParams, VectorsConfig, WithPayloadSelector,
    },
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::QdrantConfig;
use crate::errors::{KbError, Result};

use super::{EmbeddedChunk, ScoredChunk, VectorIndex};

/// Vector index delegating to a remote Qdrant collection
pub struct QdrantIndex {
    client: QdrantClient,
    collection: String,
}

impl QdrantIndex {
    /// Connect to Qdrant and create the collection if it does not exist
    pub async fn new(config: &QdrantConfig, dimension: usize) -> Result<Self> {
        let client = QdrantClient::from_url(&config.url)
            .with_api_key(config.api_key.clone())
            .build()
            .map_err(|e| KbError::IndexBackend(format!("failed to create client: {}", e)))?;

        let index = Self {
            client,
            collection: config.collection.clone(),
        };

        index.ensure_collection(dimension).await?;

        Ok(index)
    }

    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| KbError::IndexBackend(format!("failed to list collections: {}", e)))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(&CreateCollection {
                    collection_name: self.collection.clone(),
                    vectors_config: Some(VectorsConfig {
                        config: Some(Config::Params(VectorParams {
                            size: dimension as u64,
                            distance: Distance::Cosine.into(),
                            ..Default::default()
                        })),
                    }),
                    ..Default::default()
                })
                .await
                .map_err(|e| {
                    KbError::IndexBackend(format!(
                        "failed to create collection {}: {}",
                        self.collection, e
                    ))
                })?;
        }

        Ok(())
    }
}

/// Deterministic point id for a chunk id, stable across rebuilds
fn point_id_for(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

/// Extract a required string payload field; anything missing or mistyped
/// means the remote response is malformed
fn payload_string(payload: &HashMap<String, QdrantValue>, key: &str) -> Result<String> {
    payload
        .get(key)
        .and_then(|value| {
            use qdrant_client::qdrant::value::Kind;
            match value.kind.as_ref() {
                Some(Kind::StringValue(s)) => Some(s.clone()),
                _ => None,
            }
        })
        .ok_or_else(|| {
            KbError::IndexBackend(format!("malformed response: missing payload field '{}'", key))
        })
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn upsert(&self, chunks: Vec<EmbeddedChunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .into_iter()
            .map(|chunk| {
                let mut payload = HashMap::new();
                payload.insert("chunk_id".to_string(), QdrantValue::from(chunk.id.clone()));
                payload.insert("course_id".to_string(), QdrantValue::from(chunk.course_id));
                payload.insert("source".to_string(), QdrantValue::from(chunk.source));
                payload.insert("text".to_string(), QdrantValue::from(chunk.text));

                PointStruct::new(point_id_for(&chunk.id), chunk.embedding, payload)
            })
            .collect();

        self.client
            .upsert_points_blocking(&self.collection, None, points, None)
            .await
            .map_err(|e| KbError::IndexBackend(format!("failed to upsert points: {}", e)))?;

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        course_id: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let filter = course_id.map(|course| Filter {
            must: vec![Condition {
                condition_one_of: Some(
                    qdrant_client::qdrant::condition::ConditionOneOf::Field(FieldCondition {
                        key: "course_id".to_string(),
                        r#match: Some(Match {
                            match_value: Some(
                                qdrant_client::qdrant::r#match::MatchValue::Keyword(
                                    course.to_string(),
                                ),
                            ),
                        }),
                        ..Default::default()
                    }),
                ),
            }],
            ..Default::default()
        });

        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection.clone(),
                vector: vector.to_vec(),
                limit: top_k as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                filter,
                ..Default::default()
            })
            .await
            .map_err(|e| KbError::IndexBackend(format!("failed to search points: {}", e)))?;

        search_result
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;
                Ok(ScoredChunk {
                    id: payload_string(&payload, "chunk_id")?,
                    source: payload_string(&payload, "source")?,
                    course_id: payload_string(&payload, "course_id")?,
                    text: payload_string(&payload, "text")?,
                    score: point.score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_is_deterministic() {
        let id = "cs101-lecture1.txt-chunk-0";
        assert_eq!(point_id_for(id), point_id_for(id));
        assert_ne!(point_id_for(id), point_id_for("cs101-lecture1.txt-chunk-1"));
    }

    #[test]
    fn test_point_id_is_valid_uuid() {
        let id = point_id_for("cs540-notes.txt-chunk-3");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_payload_string_reads_string_fields() {
        let mut payload = HashMap::new();
        payload.insert("text".to_string(), QdrantValue::from("hello".to_string()));

        assert_eq!(payload_string(&payload, "text").unwrap(), "hello");
    }

    #[test]
    fn test_payload_string_rejects_missing_field() {
        let payload = HashMap::new();

        let err = payload_string(&payload, "chunk_id").unwrap_err();
        assert!(matches!(err, KbError::IndexBackend(_)));
        assert!(err.to_string().contains("chunk_id"));
    }

    #[test]
    fn test_payload_string_rejects_mistyped_field() {
        let mut payload = HashMap::new();
        payload.insert("text".to_string(), QdrantValue::from(42i64));

        let err = payload_string(&payload, "text").unwrap_err();
        assert!(matches!(err, KbError::IndexBackend(_)));
    }

    #[tokio::test]
    #[ignore] // Integration test - requires Qdrant
    async fn test_upsert_and_query_roundtrip() {
        let config = QdrantConfig {
            url: "http://localhost:6334".to_string(),
            collection: "coursekb_test".to_string(),
            api_key: None,
        };
        let index = QdrantIndex::new(&config, 3).await.unwrap();

        index
            .upsert(vec![EmbeddedChunk {
                id: "cs101-intro.txt-chunk-0".to_string(),
                source: "intro.txt".to_string(),
                course_id: "cs101".to_string(),
                text: "hello world".to_string(),
                embedding: vec![1.0, 0.0, 0.0],
            }])
            .await
            .unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 5, Some("cs101")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "cs101-intro.txt-chunk-0");
        assert_eq!(results[0].course_id, "cs101");

        let filtered = index.query(&[1.0, 0.0, 0.0], 5, Some("cs999")).await.unwrap();
        assert!(filtered.is_empty());
    }
}
