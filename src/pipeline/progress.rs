// file: src/pipeline/progress.rs
// description: stage progress reporting for a single filing ingestion
// reference: uses indicatif for terminal progress display

use crate::pipeline::Stage;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner tracking the current pipeline stage, with a chunk counter once
/// chunk work begins.
pub struct PipelineProgress {
    bar: ProgressBar,
}

impl PipelineProgress {
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .expect("valid spinner template"),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn enter_stage(&self, stage: Stage, detail: &str) {
        if detail.is_empty() {
            self.bar.set_message(format!("{} stage", stage));
        } else {
            self.bar.set_message(format!("{} stage: {}", stage, detail));
        }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Terminal failure state; the spinner is left in place with the reason.
    pub fn abandon(&self, message: &str) {
        self.bar
            .abandon_with_message(format!("{}: {}", Stage::Failed, message));
    }
}
