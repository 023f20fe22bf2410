// file: src/pipeline/orchestrator.rs
// description: sequences fetch, combine, split, embed, and upsert for one filing
// reference: orchestrates the ingestion workflow

use crate::combiner::DocumentCombiner;
use crate::embedder::Embedder;
use crate::error::{PipelineError, Result};
use crate::fetcher::FilingFetcher;
use crate::models::{DocType, EmbeddingRecord};
use crate::pipeline::{PipelineProgress, Stage};
use crate::splitter::ChunkSplitter;
use crate::store::VectorIndex;
use crate::utils::Validator;
use crate::utils::retry::with_retries;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub filing_id: String,
    pub stage: Stage,
    pub skipped: bool,
    pub chunks: usize,
    pub records_written: usize,
    pub duration: Duration,
}

/// Linear per-filing pipeline: fetch, combine, split, embed, upsert.
///
/// Constructed with explicit capability references; no process-wide state.
/// Different filings can run through independent pipeline instances safely
/// since record keys are filing-scoped and upsert is idempotent.
pub struct IngestPipeline {
    fetcher: FilingFetcher,
    combiner: DocumentCombiner,
    splitter: ChunkSplitter,
    embedder: Embedder,
    store: Arc<dyn VectorIndex>,
    retry_count: usize,
    show_progress: bool,
}

impl IngestPipeline {
    pub fn new(
        fetcher: FilingFetcher,
        splitter: ChunkSplitter,
        embedder: Embedder,
        store: Arc<dyn VectorIndex>,
        retry_count: usize,
    ) -> Self {
        Self {
            fetcher,
            combiner: DocumentCombiner::new(),
            splitter,
            embedder,
            store,
            retry_count: retry_count.max(1),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub async fn run(&self, ticker: &str, doc_type: DocType, force: bool) -> Result<IngestReport> {
        let started = Instant::now();
        let ticker = ticker.to_ascii_uppercase();
        Validator::validate_ticker(&ticker)?;

        let progress = PipelineProgress::new(self.show_progress);
        let result = self
            .run_stages(&ticker, doc_type, force, &progress, started)
            .await;

        match &result {
            Ok(report) if report.skipped => progress.finish("already ingested, skipped"),
            Ok(report) => progress.finish(&format!(
                "done: {} chunks in {:.2}s",
                report.chunks,
                report.duration.as_secs_f64()
            )),
            Err(err) => progress.abandon(&err.to_string()),
        }

        result
    }

    async fn run_stages(
        &self,
        ticker: &str,
        doc_type: DocType,
        force: bool,
        progress: &PipelineProgress,
        started: Instant,
    ) -> Result<IngestReport> {
        // Idempotence gate: a filing already in the store is skipped outright
        // unless the caller forces re-ingestion. When the cache knows the
        // filing identity this happens with zero fetch calls.
        if !force {
            if let Some(filing_id) = self.fetcher.cached_filing_id(ticker, doc_type) {
                if self.exists(&filing_id, ticker, doc_type).await? {
                    info!(filing_id, "filing already ingested, skipping");
                    return Ok(IngestReport {
                        filing_id,
                        stage: Stage::Done,
                        skipped: true,
                        chunks: 0,
                        records_written: 0,
                        duration: started.elapsed(),
                    });
                }
            }
        }

        progress.enter_stage(Stage::Fetching, &format!("{} {}", ticker, doc_type));
        let filing = with_retries("fetch filing", self.retry_count, || {
            self.fetcher.fetch(ticker, doc_type)
        })
        .await
        .map_err(|e| self.stage_failed(Stage::Fetching, ticker, doc_type, e))?;
        let filing_id = filing.filing_id();
        info!(
            filing_id,
            accession = filing.accession,
            documents = filing.documents.len(),
            "fetched filing"
        );

        // The cache may have been cold; re-check with the fetched identity.
        if !force && self.exists(&filing_id, ticker, doc_type).await? {
            info!(filing_id, "filing already ingested, skipping");
            return Ok(IngestReport {
                filing_id,
                stage: Stage::Done,
                skipped: true,
                chunks: 0,
                records_written: 0,
                duration: started.elapsed(),
            });
        }

        progress.enter_stage(Stage::Combining, "");
        let combined = self
            .combiner
            .combine(&filing)
            .map_err(|e| self.stage_failed(Stage::Combining, ticker, doc_type, e))?;

        progress.enter_stage(Stage::Splitting, "");
        let chunks = self.splitter.split(&combined.text, &combined.markers);
        info!(
            filing_id,
            chunks = chunks.len(),
            combined_bytes = combined.text.len(),
            "split combined text"
        );

        progress.enter_stage(Stage::Embedding, &format!("{} chunks", chunks.len()));
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| self.stage_failed(Stage::Embedding, ticker, doc_type, e))?;

        let records: Vec<EmbeddingRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddingRecord::new(&filing, chunk, vector))
            .collect();

        progress.enter_stage(Stage::Upserting, &format!("{} records", records.len()));
        // The filing's records go in as one unit and the unit is what gets
        // retried; a crash mid-upsert can leave a partial set, which the next
        // forced run overwrites key-for-key.
        let records_written = with_retries("upsert records", self.retry_count, || {
            self.store.upsert(&records)
        })
        .await
        .map_err(|e| self.stage_failed(Stage::Upserting, ticker, doc_type, e))?;

        info!(filing_id, records_written, "filing ingested");
        Ok(IngestReport {
            filing_id,
            stage: Stage::Done,
            skipped: false,
            chunks: chunks.len(),
            records_written,
            duration: started.elapsed(),
        })
    }

    async fn exists(&self, filing_id: &str, ticker: &str, doc_type: DocType) -> Result<bool> {
        with_retries("existence check", self.retry_count, || {
            self.store.exists(filing_id)
        })
        .await
        .map_err(|e| self.stage_failed(Stage::Fetching, ticker, doc_type, e))
    }

    fn stage_failed(
        &self,
        stage: Stage,
        ticker: &str,
        doc_type: DocType,
        source: PipelineError,
    ) -> PipelineError {
        warn!(stage = %stage, ticker, %doc_type, error = %source, "stage failed");
        PipelineError::StageFailed {
            stage,
            ticker: ticker.to_string(),
            doc_type,
            source: Box::new(source),
        }
    }
}
