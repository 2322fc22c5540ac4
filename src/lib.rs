//! # pdfqa
//!
//! Façade crate for grounded question answering over PDF and plain-text documents.
//! It re-exports the pipeline from [`pdfqa_rag`] together with the capability traits
//! from [`pdfqa_core`], and the `OpenAI`-compatible provider behind the `openai`
//! feature.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pdfqa::{Rag, SourceFile, openai::OpenAI};
//!
//! async fn demo(groq_key: &str, google_key: &str) -> anyhow::Result<String> {
//!     let generator = OpenAI::groq(groq_key).build()?;
//!     let embedder = OpenAI::gemini(google_key).build()?;
//!
//!     let rag = Rag::builder(embedder, generator).index_dir("./db").build()?;
//!     rag.ingest(vec![SourceFile::read("certificate.pdf")?]).await?;
//!     Ok(rag.ask("When does the certificate expire?").await?)
//! }
//! ```
//!
//! ## Crates
//!
//! - [`pdfqa_core`]: `EmbeddingModel` and `LanguageModel` traits.
//! - [`pdfqa_extract`]: ordered text extraction from PDF and text files.
//! - [`pdfqa_rag`]: chunking, vector index, persistence, and the orchestrator.
//! - `pdfqa_openai`: HTTP provider for `OpenAI`, Groq, and Gemini endpoints.

pub use pdfqa_rag::*;

/// Text extraction.
pub use pdfqa_extract as extract;

#[cfg(feature = "openai")]
/// `OpenAI`-compatible embedding and chat provider.
pub use pdfqa_openai as openai;
