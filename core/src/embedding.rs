//! # Embedding Module
//!
//! Embeddings are dense vector representations of text that capture semantic meaning.
//! Similar passages produce similar vectors, which is what lets the retrieval pipeline
//! find the chunks of an uploaded document that relate to a question.
//!
//! Two properties matter to the pipeline:
//!
//! - **Dimension**: the length of every vector a model produces. An index built with one
//!   dimension can never be queried with another.
//! - **Model identity**: vectors from different models live in different spaces even when
//!   the dimension happens to match, so the model name is persisted next to the vectors.
//!
//! ```rust
//! use pdfqa_core::EmbeddingModel;
//!
//! async fn example<T: EmbeddingModel>(model: &T) -> pdfqa_core::Result<()> {
//!     let embedding = model.embed("The certificate expires in 2026.").await?;
//!     assert_eq!(embedding.len(), model.dim());
//!     Ok(())
//! }
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::future::Future;

/// A type alias for an embedding vector of 32-bit floats.
pub type Embedding = Vec<f32>;

/// Converts text to vector representations.
///
/// # Implementation Requirements
///
/// - [`embed`](EmbeddingModel::embed) must return vectors with length equal to
///   [`dim`](EmbeddingModel::dim)
/// - the same text and model must always yield the same vector
/// - [`model_id`](EmbeddingModel::model_id) must change whenever the vector space changes
///
/// # Example
///
/// ```rust
/// use pdfqa_core::EmbeddingModel;
///
/// struct MyEmbedding;
///
/// impl EmbeddingModel for MyEmbedding {
///     fn dim(&self) -> usize {
///         768
///     }
///
///     fn model_id(&self) -> &str {
///         "models/embedding-001"
///     }
///
///     async fn embed(&self, _text: &str) -> pdfqa_core::Result<Vec<f32>> {
///         Ok(vec![0.0; self.dim()])
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let embedding = MyEmbedding.embed("The quick brown fox").await.unwrap();
/// assert_eq!(embedding.len(), 768);
/// # });
/// ```
pub trait EmbeddingModel: Sized + Send + Sync {
    /// Returns the embedding vector dimension.
    fn dim(&self) -> usize;

    /// Returns a stable identifier of the model that produced the vectors.
    fn model_id(&self) -> &str;

    /// Converts text to an embedding vector of length [`Self::dim`](EmbeddingModel::dim).
    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send;
}

impl<T: EmbeddingModel> EmbeddingModel for &T {
    fn dim(&self) -> usize {
        T::dim(self)
    }

    fn model_id(&self) -> &str {
        T::model_id(self)
    }

    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send {
        T::embed(self, text)
    }
}

impl<T: EmbeddingModel> EmbeddingModel for Arc<T> {
    fn dim(&self) -> usize {
        T::dim(self)
    }

    fn model_id(&self) -> &str {
        T::model_id(self)
    }

    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send {
        T::embed(self, text)
    }
}
