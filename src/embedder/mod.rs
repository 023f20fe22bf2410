// file: src/embedder/mod.rs
// description: embedding capability trait and batch/retry wrapper

pub mod openai;

use crate::error::{PipelineError, Result};
use crate::utils::retry::with_retries;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub use openai::OpenAiEmbedder;

/// Capability interface over the embedding service.
///
/// One call is one service round-trip; input length never exceeds the
/// configured batch size and the output is positionally 1:1 with the input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Batches chunk texts to the provider and retries transient failures.
///
/// Output vector order matches input chunk order exactly; the pipeline
/// relies on that correspondence when building embedding records.
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    retry_count: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize, retry_count: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            retry_count: retry_count.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            let batch_vectors = with_retries("embed batch", self.retry_count, || {
                self.provider.embed_batch(batch)
            })
            .await?;

            if batch_vectors.len() != batch.len() {
                return Err(PipelineError::EmbeddingService(format!(
                    "batch {} returned {} vectors for {} inputs",
                    batch_no,
                    batch_vectors.len(),
                    batch.len()
                )));
            }

            debug!(batch_no, size = batch.len(), "embedded batch");
            vectors.extend(batch_vectors);
        }

        Ok(vectors)
    }
}
