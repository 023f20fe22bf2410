// file: src/splitter.rs
// description: deterministic overlapping chunk splitter over combined filing text
// reference: internal pipeline stage

use crate::error::{PipelineError, Result};
use crate::models::Chunk;
use std::ops::Range;
use tracing::debug;

/// Splits text into overlapping chunks in a single forward pass.
///
/// Every chunk ends at `min(start + max_size, len)` and the next chunk starts
/// at `end - overlap`, so adjacent chunks share exactly `overlap` bytes except
/// possibly the final pair. Three deterministic adjustments apply:
/// - an end inside a boundary marker is pushed forward to the marker's end
///   (that chunk may run long by at most the marker tail),
/// - an end inside a multi-byte character is pushed forward to the next char
///   boundary,
/// - a next start inside a multi-byte character is pulled back to the
///   previous char boundary, widening that one overlap by the bytes skipped.
///
/// `split` is pure: identical inputs always yield the identical sequence.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    max_size: usize,
    overlap: usize,
}

impl ChunkSplitter {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        if max_size == 0 || overlap >= max_size {
            return Err(PipelineError::InvalidChunking { max_size, overlap });
        }
        Ok(Self { max_size, overlap })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Expected chunk count for a text of `len` bytes, markers aside.
    pub fn expected_chunks(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        if len <= self.max_size {
            return 1;
        }
        let step = self.max_size - self.overlap;
        (len - self.overlap).div_ceil(step)
    }

    pub fn split(&self, text: &str, markers: &[Range<usize>]) -> Vec<Chunk> {
        let len = text.len();
        if len == 0 {
            return Vec::new();
        }

        let mut chunks = Vec::with_capacity(self.expected_chunks(len));
        let mut start = 0usize;
        let mut index = 0usize;

        loop {
            let mut end = (start + self.max_size).min(len);

            if end < len {
                if let Some(marker) = markers.iter().find(|m| m.start < end && end < m.end) {
                    end = marker.end.min(len);
                }
                while end < len && !text.is_char_boundary(end) {
                    end += 1;
                }
            }

            chunks.push(Chunk {
                index,
                start,
                end,
                text: text[start..end].to_string(),
            });

            if end == len {
                break;
            }

            let mut next_start = end - self.overlap;
            while next_start > 0 && !text.is_char_boundary(next_start) {
                next_start -= 1;
            }
            // Degenerate multi-byte case where the step would not advance.
            if next_start <= start {
                next_start = end;
            }

            start = next_start;
            index += 1;
        }

        debug!(
            chunks = chunks.len(),
            bytes = len,
            max_size = self.max_size,
            overlap = self.overlap,
            "split text into chunks"
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiner::boundary_marker;
    use pretty_assertions::assert_eq;

    fn reconstruct(text_len: usize, chunks: &[Chunk]) -> String {
        let mut out = String::new();
        let mut covered = 0usize;
        for chunk in chunks {
            assert!(chunk.start <= covered, "gap before chunk {}", chunk.index);
            let skip = covered - chunk.start;
            out.push_str(&chunk.text[skip..]);
            covered = chunk.end;
        }
        assert_eq!(covered, text_len);
        out
    }

    #[test]
    fn test_documented_scenario() {
        let splitter = ChunkSplitter::new(4, 1).unwrap();
        let chunks = splitter.split("ABCDEFGHIJ", &[]);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["ABCD", "DEFG", "GHIJ"]);

        let offsets: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(offsets, vec![(0, 4), (3, 7), (6, 10)]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let splitter = ChunkSplitter::new(4, 1).unwrap();
        assert!(splitter.split("", &[]).is_empty());
    }

    #[test]
    fn test_short_text_yields_single_chunk() {
        let splitter = ChunkSplitter::new(100, 10).unwrap();
        let chunks = splitter.split("short text", &[]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!((chunks[0].start, chunks[0].end), (0, 10));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(ChunkSplitter::new(0, 0).is_err());
        assert!(ChunkSplitter::new(4, 4).is_err());
        assert!(ChunkSplitter::new(4, 5).is_err());
        assert!(ChunkSplitter::new(4, 3).is_ok());
    }

    #[test]
    fn test_reconstruction_round_trip() {
        let splitter = ChunkSplitter::new(7, 3).unwrap();
        let text = "The quick brown fox jumps over the lazy dog";
        let chunks = splitter.split(text, &[]);
        assert_eq!(reconstruct(text.len(), &chunks), text);
    }

    #[test]
    fn test_exact_overlap_between_adjacent_chunks() {
        let splitter = ChunkSplitter::new(10, 4).unwrap();
        let text = "x".repeat(137);
        let chunks = splitter.split(&text, &[]);

        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 4);
        }
        assert!(chunks.iter().all(|c| c.len() <= 10));
    }

    #[test]
    fn test_split_is_deterministic() {
        let splitter = ChunkSplitter::new(12, 5).unwrap();
        let text = "determinism ".repeat(50);
        assert_eq!(splitter.split(&text, &[]), splitter.split(&text, &[]));
    }

    #[test]
    fn test_end_inside_marker_is_pushed_to_marker_end() {
        let marker = boundary_marker("AAPL|10-K|2023-01-01", 1);
        let prefix = "a".repeat(20);
        let text = format!("{}{}{}", prefix, marker, "b".repeat(40));
        let marker_range = prefix.len()..prefix.len() + marker.len();

        // max_size 25 would cut five bytes into the marker.
        let splitter = ChunkSplitter::new(25, 2).unwrap();
        let chunks = splitter.split(&text, &[marker_range.clone()]);

        assert_eq!(chunks[0].end, marker_range.end);
        assert!(chunks[0].text.ends_with(&marker));
        assert_eq!(reconstruct(text.len(), &chunks), text);
    }

    #[test]
    fn test_end_on_marker_edge_is_not_adjusted() {
        let marker = boundary_marker("AAPL|10-K|2023-01-01", 1);
        let prefix = "a".repeat(10);
        let text = format!("{}{}{}", prefix, marker, "b".repeat(40));
        let marker_range = prefix.len()..prefix.len() + marker.len();

        // max_size lands exactly on the marker start: no split inside it.
        let splitter = ChunkSplitter::new(10, 2).unwrap();
        let chunks = splitter.split(&text, &[marker_range]);
        assert_eq!(chunks[0].end, 10);
    }

    #[test]
    fn test_multibyte_end_pushed_to_char_boundary() {
        let splitter = ChunkSplitter::new(4, 1).unwrap();
        // 'é' is two bytes and straddles the byte-4 boundary.
        let text = "abcémnop";
        let chunks = splitter.split(text, &[]);
        assert_eq!(reconstruct(text.len(), &chunks), text);
        for chunk in &chunks {
            assert!(text.is_char_boundary(chunk.start));
            assert!(text.is_char_boundary(chunk.end));
        }
    }

    #[test]
    fn test_multibyte_start_pulled_back_widens_one_overlap() {
        let splitter = ChunkSplitter::new(4, 1).unwrap();
        // The first end lands inside 'é' and is pushed to byte 5; the next
        // start at 5 - 1 = 4 is pulled back to byte 3, so that pair overlaps
        // by two bytes instead of one.
        let text = "abcémnop";
        let chunks = splitter.split(text, &[]);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcé", "émn", "nop"]);
        assert_eq!(chunks[0].end - chunks[1].start, 2);
        assert_eq!(chunks[1].end - chunks[2].start, 1);
    }

    #[test]
    fn test_expected_chunk_count_matches_split() {
        let splitter = ChunkSplitter::new(9, 2).unwrap();
        for len in [0usize, 1, 8, 9, 10, 50, 137] {
            let text = "y".repeat(len);
            let chunks = splitter.split(&text, &[]);
            assert_eq!(chunks.len(), splitter.expected_chunks(len), "len={}", len);
        }
    }
}
