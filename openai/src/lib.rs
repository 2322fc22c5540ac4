//! `OpenAI`-compatible provider for pdfqa.
//!
//! [`OpenAI`] implements both [`pdfqa_core::EmbeddingModel`] (`POST /embeddings`) and
//! [`pdfqa_core::LanguageModel`] (`POST /chat/completions`). Any service speaking the
//! same wire format works by changing the base URL, so the usual deployment pairs a
//! Groq chat model with a Gemini embedding model:
//!
//! ```no_run
//! use pdfqa_openai::{GEMINI_TEXT_EMBEDDING_004, OpenAI};
//!
//! # fn demo() -> Result<(), pdfqa_openai::OpenAIError> {
//! let generator = OpenAI::groq(std::env::var("GROQ_API_KEY").unwrap_or_default())
//!     .temperature(0.0)
//!     .build()?;
//! let embedder = OpenAI::gemini(std::env::var("GOOGLE_API_KEY").unwrap_or_default())
//!     .embedding_model(GEMINI_TEXT_EMBEDDING_004)
//!     .build()?;
//! # let _ = (generator, embedder);
//! # Ok(()) }
//! ```
//!
//! The client performs a single attempt per call, bounded by the HTTP timeout.
//! Retries belong to the caller.

mod client;
mod embedding;
mod error;
mod request;
mod response;

pub use client::{Builder, OpenAI};
pub use error::OpenAIError;

mod constant;
pub use constant::*;

pub(crate) const DEFAULT_MODEL: &str = GPT4O_MINI;
pub(crate) const DEFAULT_BASE_URL: &str = OPENAI_BASE_URL;
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = EMBEDDING_SMALL;
pub(crate) const DEFAULT_EMBEDDING_DIM: usize = 1536;
