//! # Language Models
//!
//! The answering pipeline needs exactly one thing from a generation provider: given a
//! fully assembled prompt (instructions, retrieved context and the user question), return
//! the completion text. Chat history, tool calling and streaming are concerns of the
//! provider or of the surrounding application, never of the retrieval core.
//!
//! ```rust
//! use pdfqa_core::LanguageModel;
//!
//! struct Echo;
//!
//! impl LanguageModel for Echo {
//!     async fn generate(&self, prompt: &str) -> pdfqa_core::Result {
//!         Ok(prompt.to_owned())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! assert_eq!(Echo.generate("hello").await.unwrap(), "hello");
//! # });
//! ```

use alloc::string::String;
use alloc::sync::Arc;
use core::future::Future;

/// Produces a natural-language completion for a prompt.
///
/// Implementations are expected to be stateless between calls: the orchestrator may call
/// [`generate`](LanguageModel::generate) concurrently and retries failed calls with the
/// same prompt.
pub trait LanguageModel: Sized + Send + Sync {
    /// Generates the completion for `prompt`.
    fn generate(&self, prompt: &str) -> impl Future<Output = crate::Result<String>> + Send;

    /// Returns the model name used for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

impl<T: LanguageModel> LanguageModel for &T {
    fn generate(&self, prompt: &str) -> impl Future<Output = crate::Result<String>> + Send {
        T::generate(self, prompt)
    }

    fn name(&self) -> &str {
        T::name(self)
    }
}

impl<T: LanguageModel> LanguageModel for Arc<T> {
    fn generate(&self, prompt: &str) -> impl Future<Output = crate::Result<String>> + Send {
        T::generate(self, prompt)
    }

    fn name(&self) -> &str {
        T::name(self)
    }
}
