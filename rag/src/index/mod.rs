//! Exact cosine-similarity vector index.
//!
//! A [`VectorIndex`] is an immutable snapshot: it is built once from a full set of
//! chunks and embeddings and replaced as a whole on the next ingestion. Search scores
//! every entry in parallel with rayon, which stays fast for the corpus sizes a
//! document upload produces and returns exact results.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::types::{Chunk, IndexEntry, ModelIdentity, SearchResult};

/// Snapshot of chunk embeddings produced by a single embedding model.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    identity: ModelIdentity,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Builds an index from chunks and their embeddings, paired by position.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if the counts differ or any embedding does not
    /// have `identity.dimension` components.
    pub fn build(
        identity: ModelIdentity,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::DimensionMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();
        Self::from_entries(identity, entries)
    }

    /// Creates an index from prepared entries.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if any embedding has the wrong length.
    pub fn from_entries(identity: ModelIdentity, entries: Vec<IndexEntry>) -> Result<Self> {
        if let Some(bad) = entries
            .iter()
            .find(|entry| entry.embedding.len() != identity.dimension)
        {
            return Err(RagError::DimensionMismatch {
                expected: identity.dimension,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self { identity, entries })
    }

    /// Returns up to `k` entries with cosine similarity `>= min_score`.
    ///
    /// Results are ordered by score descending; equal scores keep index order, so
    /// earlier chunks win ties.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if `query` has the wrong length.
    pub fn search(&self, query: &[f32], k: usize, min_score: f32) -> Result<Vec<SearchResult>> {
        if query.len() != self.identity.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.identity.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        // NaN scores fail the comparison and are dropped here.
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(&entry.embedding, query)))
            .filter(|&(_, score)| score >= min_score)
            .collect();

        scored.par_sort_unstable_by_key(|&(position, score)| (Reverse(OrderedFloat(score)), position));
        scored.truncate(k);

        debug!(
            candidates = self.entries.len(),
            hits = scored.len(),
            top_score = scored.first().map(|&(_, score)| score),
            "vector search"
        );

        Ok(scored
            .into_iter()
            .map(|(position, score)| SearchResult {
                chunk: self.entries[position].chunk.clone(),
                score,
            })
            .collect())
    }

    /// Model that produced the embeddings.
    #[must_use]
    pub const fn identity(&self) -> &ModelIdentity {
        &self.identity
    }

    /// Returns the embedding dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.identity.dimension
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in index order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Iterates the indexed chunks in order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|entry| &entry.chunk)
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
