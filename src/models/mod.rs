// file: src/models/mod.rs
// description: core data structures for filings, chunks, and embedding records

pub mod chunk;
pub mod filing;
pub mod record;

pub use chunk::Chunk;
pub use filing::{DocType, DocumentKind, Filing, RawDocument};
pub use record::{EmbeddingRecord, RecordMetadata, SearchHit};
