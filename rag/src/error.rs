//! Error types for the RAG crate.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FileFailure;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document is not in a format any extractor understands.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The document claims a known format but its content is corrupt.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Chunking or retrieval settings are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Vector lengths disagree with the index dimension, or chunk and vector counts differ.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension (or count).
        expected: usize,
        /// Actual dimension (or count) provided.
        actual: usize,
    },

    /// Nothing is persisted at the given location.
    #[error("no index found at {}", .0.display())]
    IndexNotFound(PathBuf),

    /// A question was asked before any documents were ingested.
    #[error("index does not exist; ingest documents first")]
    IndexUnavailable,

    /// The persisted index failed validation.
    #[error("index is corrupted: {0}")]
    IndexCorrupted(String),

    /// The index was built with a different embedding model than the one configured now.
    #[error("embedding model mismatch: index built with {persisted}, current model is {current}")]
    ModelMismatch {
        /// Identity recorded in the index.
        persisted: String,
        /// Identity of the configured embedder.
        current: String,
    },

    /// `ingest` was called with an empty file list.
    #[error("no documents provided")]
    NoDocumentsProvided,

    /// Every file in the batch failed.
    #[error("ingestion failed: none of {} file(s) could be processed", failures.len())]
    IngestionFailed {
        /// Per-file reasons.
        failures: Vec<FileFailure>,
    },

    /// A provider call kept failing or timing out.
    #[error("{operation} provider unavailable after {attempts} attempt(s): {reason}")]
    ProviderUnavailable {
        /// Which capability failed (`embedding` or `generation`).
        operation: &'static str,
        /// Number of attempts made.
        attempts: u32,
        /// Last failure.
        reason: String,
    },

    /// Persistence operation failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<pdfqa_extract::ExtractError> for RagError {
    fn from(err: pdfqa_extract::ExtractError) -> Self {
        use pdfqa_extract::ExtractError;

        match err {
            ExtractError::UnsupportedFormat(reason) => Self::UnsupportedFormat(reason),
            ExtractError::Extraction(reason) => Self::Extraction(reason),
            ExtractError::Io(source) => Self::Io(source),
        }
    }
}

/// Result type alias for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
