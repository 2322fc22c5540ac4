//! Core types for the RAG crate.

use std::fmt;

use pdfqa_core::EmbeddingModel;
use serde::{Deserialize, Serialize};

/// A contiguous piece of a document's extracted text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Filename of the document this chunk came from.
    pub source_id: String,
    /// Ordinal of this chunk within the document, contiguous across segments.
    pub index: usize,
    /// Index of the extracted segment (page) the chunk belongs to.
    pub segment: usize,
    /// Character offset of the chunk inside its segment.
    pub start: usize,
    /// Text content of the chunk.
    pub text: String,
}

impl Chunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(
        source_id: impl Into<String>,
        index: usize,
        segment: usize,
        start: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            index,
            segment,
            start,
            text: text.into(),
        }
    }

    /// Stable identifier (format: `{source_id}#chunk_{index}`).
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}#chunk_{}", self.source_id, self.index)
    }
}

/// A search result containing a chunk and its similarity score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matching chunk.
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`, higher is better.
    pub score: f32,
}

/// Internal entry stored in the index.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexEntry {
    /// The chunk.
    pub chunk: Chunk,
    /// The embedding vector.
    pub embedding: Vec<f32>,
}

impl IndexEntry {
    /// Creates a new index entry.
    #[must_use]
    pub const fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }
}

/// Which embedding model produced an index.
///
/// Vectors from different models live in unrelated spaces, so an index is only
/// queried with the model that built it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelIdentity {
    /// Provider model identifier.
    pub model: String,
    /// Embedding dimension.
    pub dimension: usize,
}

impl ModelIdentity {
    /// Creates an identity.
    #[must_use]
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }

    /// Reads the identity of an embedding model.
    #[must_use]
    pub fn of<M: EmbeddingModel>(embedder: &M) -> Self {
        Self::new(embedder.model_id(), embedder.dim())
    }
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} dims)", self.model, self.dimension)
    }
}

/// A generated answer together with the context it was grounded on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Answer {
    /// The question as asked.
    pub question: String,
    /// Retrieved chunk texts joined in ranked order.
    pub context: String,
    /// Generator output, verbatim.
    pub text: String,
    /// Retrieved chunks with their scores.
    pub sources: Vec<SearchResult>,
}

/// Outcome of an ingestion batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestionStatus {
    /// Every file was indexed.
    #[serde(rename = "Successfully Uploaded")]
    Complete,
    /// Some files failed and were left out of the index.
    #[serde(rename = "Partially Uploaded")]
    Partial,
}

impl fmt::Display for IngestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Complete => "Successfully Uploaded",
            Self::Partial => "Partially Uploaded",
        })
    }
}

/// A file that could not be ingested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Name of the file.
    pub filename: String,
    /// Human-readable cause.
    pub reason: String,
}

impl FileFailure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}

/// Summary returned by a successful ingestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Whether all files made it into the index.
    pub status: IngestionStatus,
    /// Files that were indexed, in input order.
    pub filenames: Vec<String>,
    /// Number of chunks in the new index.
    pub total_chunks: usize,
    /// Files that were skipped.
    pub failures: Vec<FileFailure>,
}

impl IngestionReport {
    /// Renders the report as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Observable lifecycle state of an index directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexState {
    /// Nothing has been ingested.
    Empty,
    /// An ingestion is running on this handle.
    Building,
    /// A persisted index is available.
    Ready {
        /// Number of indexed chunks.
        chunks: usize,
        /// Model that built the index.
        identity: ModelIdentity,
    },
}
