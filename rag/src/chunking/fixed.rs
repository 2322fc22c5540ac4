//! Fixed-size text chunking.

use crate::error::{RagError, Result};
use crate::types::Chunk;

use super::Chunker;

/// Chunks text into fixed-size character windows with configurable overlap.
///
/// Each segment is split on its own. Windows are measured in Unicode scalar values
/// and never straddle a segment boundary, so every chunk belongs to exactly one page.
///
/// # Example
///
/// ```rust
/// use pdfqa_rag::chunking::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(100, 20).unwrap();
/// let chunks = chunker.split("doc.pdf", &["Long text content...".to_string()]).unwrap();
/// assert_eq!(chunks.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    /// Maximum size of each chunk in characters.
    chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    overlap: usize,
}

impl FixedSizeChunker {
    /// Creates a new fixed-size chunker.
    ///
    /// # Errors
    /// [`RagError::InvalidConfiguration`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk_size must be positive".into(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Maximum characters per chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive chunks.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    const fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Number of chunks produced for a non-blank segment of `chars` characters.
    #[must_use]
    pub const fn chunk_count(&self, chars: usize) -> usize {
        if chars == 0 {
            0
        } else if chars <= self.chunk_size {
            1
        } else {
            1 + (chars - self.chunk_size).div_ceil(self.step())
        }
    }

    fn split_segment(&self, segment: &str, mut emit: impl FnMut(usize, &str)) {
        if segment.trim().is_empty() {
            return;
        }

        // Byte offset of every char boundary, including the end of the string.
        let bounds: Vec<usize> = segment
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(segment.len()))
            .collect();
        let chars = bounds.len() - 1;

        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(chars);
            emit(start, &segment[bounds[start]..bounds[end]]);
            if end == chars {
                break;
            }
            start += self.step();
        }
    }
}

impl Default for FixedSizeChunker {
    /// 1000 characters with 50 characters of overlap.
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 50,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn split(&self, source_id: &str, segments: &[String]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for (segment_idx, segment) in segments.iter().enumerate() {
            self.split_segment(segment, |start, text| {
                let index = chunks.len();
                chunks.push(Chunk::new(source_id, index, segment_idx, start, text));
            });
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}
