//! # pdfqa-core
//!
//! `pdfqa-core` hosts the `no_std` capability traits the question-answering pipeline is
//! written against. The orchestrator never talks to a concrete service: it is handed an
//! [`EmbeddingModel`] and a [`LanguageModel`], and every provider crate simply implements
//! these two traits.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   pdfqa-rag     │───▶│   pdfqa-core     │◀───│   Providers     │
//! │                 │    │   (this crate)   │    │                 │
//! │ - ingest        │    │ - EmbeddingModel │    │ - openai        │
//! │ - answer        │    │ - LanguageModel  │    │ - groq          │
//! │                 │    │                  │    │ - test fakes    │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! | Capability | Trait | Description |
//! |------------|-------|-------------|
//! | **Embeddings** | [`EmbeddingModel`] | Convert text to vectors for similarity search |
//! | **Generation** | [`LanguageModel`] | Turn a fully assembled prompt into a completion |
//!
//! ## Example
//!
//! ```rust
//! use pdfqa_core::{EmbeddingModel, LanguageModel};
//!
//! async fn grounded<E: EmbeddingModel, G: LanguageModel>(
//!     embedder: &E,
//!     generator: &G,
//!     question: &str,
//! ) -> pdfqa_core::Result {
//!     let vector = embedder.embed(question).await?;
//!     assert_eq!(vector.len(), embedder.dim());
//!     generator.generate(question).await
//! }
//! ```

#![no_std]
extern crate alloc;

/// Text embeddings.
pub mod embedding;
/// Prompt completion.
pub mod llm;

use alloc::string::String;

#[doc(inline)]
pub use embedding::{Embedding, EmbeddingModel};
#[doc(inline)]
pub use llm::LanguageModel;

/// Result type used throughout the crate.
///
/// Type alias for [`anyhow::Result<T>`](anyhow::Result) with [`String`] as default success type.
pub type Result<T = String> = anyhow::Result<T>;

pub use anyhow::Error;
