// file: src/embedder/openai.rs
// description: OpenAI embeddings API client with deterministic offline fallback
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::EmbeddingConfig;
use crate::embedder::EmbeddingProvider;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    client: Client,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if config.api_key.is_none() {
            warn!("no embedding API key configured, using deterministic fallback vectors");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    /// Deterministic stand-in vector used when no API key is configured.
    pub fn fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        (0..dim)
            .map(|i| (hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0)
            .collect()
    }

    async fn request_embeddings(&self, api_key: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        debug!(inputs = texts.len(), model = self.model, "requesting embeddings");

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PipelineError::EmbeddingService(format!(
                "embeddings request failed with status {}: {}",
                status, body
            )));
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

        // The API tags rows with their input index; order by it so the
        // positional correspondence with the inputs holds.
        let mut data = payload.data;
        data.sort_by_key(|row| row.index);

        if data.len() != texts.len() {
            return Err(PipelineError::EmbeddingService(format!(
                "service returned {} embeddings for {} inputs",
                data.len(),
                texts.len()
            )));
        }

        Ok(data.into_iter().map(|row| row.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.api_key {
            Some(key) => self.request_embeddings(key, texts).await,
            None => Ok(texts
                .iter()
                .map(|t| Self::fallback_embedding(t, self.dimension))
                .collect()),
        }
    }
}
