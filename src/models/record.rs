// file: src/models/record.rs
// description: embedding record persisted to the vector index, with stable keys
// reference: internal data structures

use crate::models::{Chunk, DocType, Filing};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Payload stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub ticker: String,
    pub doc_type: DocType,
    pub filing_date: NaiveDate,
}

/// One (chunk, vector) pair keyed deterministically by (filing_id, chunk_index).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub filing_id: String,
    pub chunk_index: usize,
    pub vector: Vec<f32>,
    pub chunk_text: String,
    pub metadata: RecordMetadata,
}

impl EmbeddingRecord {
    pub fn new(filing: &Filing, chunk: &Chunk, vector: Vec<f32>) -> Self {
        Self {
            filing_id: filing.filing_id(),
            chunk_index: chunk.index,
            vector,
            chunk_text: chunk.text.clone(),
            metadata: RecordMetadata {
                ticker: filing.ticker.clone(),
                doc_type: filing.doc_type,
                filing_date: filing.filing_date,
            },
        }
    }

    /// Stable point id: UUID carved from sha256(filing_id # chunk_index).
    ///
    /// The same filing and chunk index always map to the same id, which is
    /// what makes re-upserts overwrite in place instead of duplicating.
    pub fn point_id(&self) -> Uuid {
        let mut hasher = Sha256::new();
        hasher.update(self.filing_id.as_bytes());
        hasher.update(b"#");
        hasher.update(self.chunk_index.to_string().as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Uuid::from_bytes(bytes)
    }
}

/// A single similarity-search result returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub filing_id: String,
    pub chunk_index: usize,
    pub score: f32,
    pub chunk_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;
    use crate::models::RawDocument;
    use pretty_assertions::assert_eq;

    fn sample_filing() -> Filing {
        Filing {
            ticker: "AAPL".to_string(),
            doc_type: DocType::TenK,
            filing_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            accession: "0000320193-23-000001".to_string(),
            documents: vec![RawDocument {
                sequence: 0,
                name: "aapl-10k.htm".to_string(),
                kind: DocumentKind::Primary,
                content: vec![],
            }],
        }
    }

    fn sample_chunk(index: usize) -> Chunk {
        Chunk {
            index,
            start: 0,
            end: 4,
            text: "ABCD".to_string(),
        }
    }

    #[test]
    fn test_point_id_stable_across_runs() {
        let filing = sample_filing();
        let a = EmbeddingRecord::new(&filing, &sample_chunk(3), vec![0.1]);
        let b = EmbeddingRecord::new(&filing, &sample_chunk(3), vec![0.9]);
        assert_eq!(a.point_id(), b.point_id());
    }

    #[test]
    fn test_point_id_differs_per_chunk() {
        let filing = sample_filing();
        let a = EmbeddingRecord::new(&filing, &sample_chunk(0), vec![]);
        let b = EmbeddingRecord::new(&filing, &sample_chunk(1), vec![]);
        assert_ne!(a.point_id(), b.point_id());
    }

    #[test]
    fn test_metadata_carries_filing_identity() {
        let filing = sample_filing();
        let record = EmbeddingRecord::new(&filing, &sample_chunk(0), vec![]);
        assert_eq!(record.filing_id, "AAPL|10-K|2023-01-01");
        assert_eq!(record.metadata.ticker, "AAPL");
        assert_eq!(record.metadata.doc_type, DocType::TenK);
    }
}
