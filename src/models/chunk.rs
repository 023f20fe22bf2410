// file: src/models/chunk.rs
// description: chunk model produced by the splitter
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// A bounded-length slice of a filing's combined text.
///
/// Offsets are byte offsets into the combined text. Chunks are emitted in
/// non-decreasing offset order and adjacent chunks share exactly the
/// configured overlap, except possibly the final pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_len() {
        let chunk = Chunk {
            index: 0,
            start: 3,
            end: 7,
            text: "DEFG".to_string(),
        };
        assert_eq!(chunk.len(), 4);
        assert!(!chunk.is_empty());
    }
}
