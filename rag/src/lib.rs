//! Retrieval-augmented question answering over uploaded documents.
//!
//! The pipeline has three stages:
//!
//! 1. **Ingestion**: files are extracted to text segments ([`pdfqa_extract`]), split
//!    into overlapping fixed-size chunks ([`chunking`]) and embedded with an
//!    [`EmbeddingModel`]. The resulting [`VectorIndex`] replaces the previous one on
//!    disk in a single atomic rename ([`persistence`]).
//! 2. **Retrieval**: a question is embedded with the same model and matched against
//!    every chunk by cosine similarity, keeping the best `top_k` above a threshold.
//! 3. **Generation**: the retrieved chunks fill a prompt template that a
//!    [`LanguageModel`] answers.
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfqa_rag::{Rag, SourceFile};
//!
//! let rag = Rag::builder(embedder, generator).index_dir("./db").build()?;
//! let report = rag.ingest(vec![SourceFile::read("contract.pdf")?]).await?;
//! println!("{}", report.to_json()?);
//!
//! let reply = rag.ask("When does the certificate expire?").await?;
//! ```
//!
//! Provider calls are bounded by a timeout and retried with exponential backoff
//! ([`RetryConfig`]); exhaustion surfaces as [`RagError::ProviderUnavailable`].

pub mod chunking;
pub mod config;
pub mod error;
pub mod index;
pub mod indexing;
pub mod persistence;
pub mod prompt;
mod rag;
pub mod retry;
pub mod types;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use error::{RagError, Result};
pub use index::VectorIndex;
pub use indexing::{IngestProgress, IngestStage};
pub use persistence::{Persistence, RkyvPersistence};
pub use prompt::{DEFAULT_TEMPLATE, PromptTemplate};
pub use rag::{INDEX_UNAVAILABLE_MESSAGE, Rag, RagBuilder};
pub use retry::RetryConfig;
pub use types::{
    Answer, Chunk, FileFailure, IndexEntry, IndexState, IngestionReport, IngestionStatus,
    ModelIdentity, SearchResult,
};

pub use pdfqa_core::{EmbeddingModel, LanguageModel};
pub use pdfqa_extract::{Extractor, ExtractorRegistry, SourceFile};
