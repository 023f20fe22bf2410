// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use crate::models::DocType;
use crate::pipeline::Stage;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no {doc_type} filing found for {ticker}")]
    NotFound { ticker: String, doc_type: DocType },

    #[error("filings registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("filing {0} has no documents")]
    EmptyFiling(String),

    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid chunking parameters: max_size {max_size}, overlap {overlap}")]
    InvalidChunking { max_size: usize, overlap: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{stage} stage failed for {ticker} {doc_type}: {source}")]
    StageFailed {
        stage: Stage,
        ticker: String,
        doc_type: DocType,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Transient errors are retried with backoff; everything else is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::RegistryUnavailable(_)
                | PipelineError::EmbeddingService(_)
                | PipelineError::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PipelineError::RegistryUnavailable("timeout".into()).is_transient());
        assert!(PipelineError::EmbeddingService("503".into()).is_transient());
        assert!(PipelineError::StoreUnavailable("refused".into()).is_transient());
        assert!(!PipelineError::EmptyFiling("AAPL|10-K|2023-01-01".into()).is_transient());
        assert!(
            !PipelineError::NotFound {
                ticker: "AAPL".into(),
                doc_type: DocType::TenK,
            }
            .is_transient()
        );
    }
}
