// file: src/store/qdrant.rs
// description: Qdrant REST client implementing the vector index capability
// reference: https://qdrant.tech/documentation/concepts/points/

use crate::config::StoreConfig;
use crate::error::{PipelineError, Result};
use crate::models::{EmbeddingRecord, SearchHit};
use crate::store::VectorIndex;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    points: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Value,
}

impl QdrantStore {
    pub fn new(config: &StoreConfig, dimension: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            collection: config.collection.clone(),
            dimension,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{}", self.base_url, self.collection, suffix)
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| PipelineError::StoreUnavailable(format!("{}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PipelineError::StoreUnavailable(format!(
                "{} failed with status {}: {}",
                what, status, body
            )));
        }
        Ok(response)
    }

    /// Creates the collection at the configured dimension if missing.
    pub async fn ensure_collection(&self) -> Result<()> {
        let response = self
            .authorized(self.client.get(self.collection_url("")))
            .send()
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        if response.status().is_success() {
            debug!(collection = self.collection, "collection already exists");
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(PipelineError::StoreUnavailable(format!(
                "collection check failed with status {}",
                response.status()
            )));
        }

        let body = json!({
            "vectors": { "size": self.dimension, "distance": "Cosine" }
        });
        self.send(
            self.client.put(self.collection_url("")).json(&body),
            "create collection",
        )
        .await?;

        info!(
            collection = self.collection,
            dimension = self.dimension,
            "created collection"
        );
        Ok(())
    }

    fn point_for(record: &EmbeddingRecord) -> Value {
        json!({
            "id": record.point_id().to_string(),
            "vector": record.vector,
            "payload": {
                "filing_id": record.filing_id,
                "chunk_index": record.chunk_index,
                "chunk_text": record.chunk_text,
                "ticker": record.metadata.ticker,
                "doc_type": record.metadata.doc_type.as_str(),
                "filing_date": record.metadata.filing_date.to_string(),
            }
        })
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        self.ensure_collection().await?;

        let points: Vec<Value> = records.iter().map(Self::point_for).collect();
        let body = json!({ "points": points });

        self.send(
            self.client
                .put(self.collection_url("/points?wait=true"))
                .json(&body),
            "upsert points",
        )
        .await?;

        debug!(
            collection = self.collection,
            points = records.len(),
            "upserted points"
        );
        Ok(records.len())
    }

    async fn exists(&self, filing_id: &str) -> Result<bool> {
        // A missing collection means nothing was ever ingested.
        let response = self
            .authorized(self.client.get(self.collection_url("")))
            .send()
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let body = json!({
            "filter": {
                "must": [{ "key": "filing_id", "match": { "value": filing_id } }]
            },
            "limit": 1,
            "with_payload": false,
            "with_vector": false
        });

        let response = self
            .send(
                self.client
                    .post(self.collection_url("/points/scroll"))
                    .json(&body),
                "existence check",
            )
            .await?;

        let scroll: ScrollResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;
        Ok(!scroll.result.points.is_empty())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true
        });

        let response = self
            .send(
                self.client
                    .post(self.collection_url("/points/search"))
                    .json(&body),
                "vector search",
            )
            .await?;

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        Ok(search
            .result
            .into_iter()
            .map(|point| SearchHit {
                filing_id: point.payload["filing_id"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                chunk_index: point.payload["chunk_index"].as_u64().unwrap_or(0) as usize,
                score: point.score,
                chunk_text: point.payload["chunk_text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect())
    }
}
