// file: src/combiner.rs
// description: concatenates a filing's documents into one marked-up text blob
// reference: internal pipeline stage

use crate::error::{PipelineError, Result};
use crate::models::Filing;
use std::ops::Range;
use tracing::debug;

/// The combined text of a filing plus the byte ranges of its boundary markers.
///
/// Document order in `text` matches `RawDocument.sequence` ascending; each
/// document is preceded by a marker encoding the filing id and the document's
/// sequence index, so provenance can be recovered for any offset.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedText {
    pub filing_id: String,
    pub text: String,
    pub markers: Vec<Range<usize>>,
}

/// Marker inserted before each constituent document.
///
/// The `@@DOC ...@@` framing does not occur in EDGAR document bodies, and the
/// embedded filing id keeps markers distinct across filings.
pub fn boundary_marker(filing_id: &str, sequence: usize) -> String {
    format!("\n@@DOC {}#{}@@\n", filing_id, sequence)
}

#[derive(Debug, Default)]
pub struct DocumentCombiner;

impl DocumentCombiner {
    pub fn new() -> Self {
        Self
    }

    /// Concatenates the filing's documents in sequence order.
    ///
    /// Pure given the same ordered document list. Fails with `EmptyFiling`
    /// when the filing has zero documents. Document bytes are decoded as
    /// UTF-8 with lossy replacement; EDGAR serves text formats throughout.
    pub fn combine(&self, filing: &Filing) -> Result<CombinedText> {
        let filing_id = filing.filing_id();

        if filing.documents.is_empty() {
            return Err(PipelineError::EmptyFiling(filing_id));
        }

        let mut text = String::new();
        let mut markers = Vec::with_capacity(filing.documents.len());

        for doc in filing.ordered_documents() {
            let marker = boundary_marker(&filing_id, doc.sequence);
            let marker_start = text.len();
            text.push_str(&marker);
            markers.push(marker_start..text.len());
            text.push_str(&String::from_utf8_lossy(&doc.content));
        }

        debug!(
            filing_id = %filing_id,
            documents = filing.documents.len(),
            combined_bytes = text.len(),
            "combined filing documents"
        );

        Ok(CombinedText {
            filing_id,
            text,
            markers,
        })
    }
}
