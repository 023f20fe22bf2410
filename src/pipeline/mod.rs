// file: src/pipeline/mod.rs
// description: ingestion pipeline orchestration and stage reporting

pub mod orchestrator;
pub mod progress;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use orchestrator::{IngestPipeline, IngestReport};
pub use progress::PipelineProgress;

/// Per-filing state machine. `Failed` is terminal from any stage once
/// retries are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Fetching,
    Combining,
    Splitting,
    Embedding,
    Upserting,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetch",
            Stage::Combining => "combine",
            Stage::Splitting => "split",
            Stage::Embedding => "embed",
            Stage::Upserting => "upsert",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}
