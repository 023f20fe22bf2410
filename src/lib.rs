// file: src/lib.rs
// description: library entry point and public api exports
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod combiner;
pub mod config;
pub mod embedder;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod splitter;
pub mod store;
pub mod utils;

pub use combiner::{CombinedText, DocumentCombiner, boundary_marker};
pub use config::{
    ChunkingConfig, Config, EdgarConfig, EmbeddingConfig, PipelineConfig, StoreConfig,
};
pub use embedder::{Embedder, EmbeddingProvider, OpenAiEmbedder};
pub use error::{PipelineError, Result};
pub use fetcher::FilingFetcher;
pub use models::{Chunk, DocType, DocumentKind, EmbeddingRecord, Filing, RawDocument, SearchHit};
pub use pipeline::{IngestPipeline, IngestReport, Stage};
pub use registry::{EdgarRegistry, FilingRegistry};
pub use splitter::ChunkSplitter;
pub use store::{QdrantStore, VectorIndex};
pub use utils::Validator;
