//! Text chunking strategies for RAG.
//!
//! This module provides the [`Chunker`] trait and the [`FixedSizeChunker`]
//! implementation for splitting extracted documents into indexable chunks.

mod fixed;

pub use fixed::FixedSizeChunker;

use crate::error::Result;
use crate::types::Chunk;

/// Trait for text chunking strategies.
///
/// Chunkers split a document's extracted segments into smaller pieces that can be
/// individually embedded and searched.
pub trait Chunker: Send + Sync {
    /// Splits a document's segments into chunks.
    ///
    /// # Arguments
    /// * `source_id` - Filename of the document
    /// * `segments` - Extracted text segments, in reading order
    ///
    /// # Returns
    /// Chunks in segment order then position order, with contiguous indices.
    fn split(&self, source_id: &str, segments: &[String]) -> Result<Vec<Chunk>>;

    /// Returns the name of this chunking strategy.
    fn name(&self) -> &'static str;
}
