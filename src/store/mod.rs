// file: src/store/mod.rs
// description: vector index capability trait and the Qdrant implementation

pub mod qdrant;

use crate::error::Result;
use crate::models::{EmbeddingRecord, SearchHit};
use async_trait::async_trait;

pub use qdrant::QdrantStore;

/// Capability interface over the vector index.
///
/// Upsert is idempotent per record key: re-upserting the same
/// (filing_id, chunk_index) overwrites vector, text, and metadata in place.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Persists the records and returns the count written.
    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<usize>;

    /// Whether any record for the filing-level key prefix exists.
    async fn exists(&self, filing_id: &str) -> Result<bool>;

    /// Nearest chunks to the query vector.
    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>>;
}
