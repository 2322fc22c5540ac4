//! Provider construction for the CLI.
//!
//! Chat and embeddings may live on different services, so each side has its own
//! base URL, model and key.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use pdfqa_openai::{GEMINI_BASE_URL, GEMINI_TEXT_EMBEDDING_004, GEMMA2_9B_IT, GROQ_BASE_URL, OpenAI};

/// Chat provider settings.
#[derive(Debug, Clone, Args)]
pub struct ChatArgs {
    /// OpenAI-compatible base URL of the chat service.
    #[arg(long, env = "PDFQA_CHAT_BASE_URL", default_value = GROQ_BASE_URL)]
    pub chat_base_url: String,

    /// Chat model name.
    #[arg(long, env = "PDFQA_CHAT_MODEL", default_value = GEMMA2_9B_IT)]
    pub chat_model: String,

    /// API key for the chat service. Falls back to `GROQ_API_KEY`.
    #[arg(long, env = "PDFQA_CHAT_API_KEY", hide_env_values = true)]
    pub chat_api_key: Option<String>,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.0)]
    pub temperature: f32,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Args)]
pub struct EmbeddingArgs {
    /// OpenAI-compatible base URL of the embedding service.
    #[arg(long, env = "PDFQA_EMBEDDING_BASE_URL", default_value = GEMINI_BASE_URL)]
    pub embedding_base_url: String,

    /// Embedding model name.
    #[arg(long, env = "PDFQA_EMBEDDING_MODEL", default_value = GEMINI_TEXT_EMBEDDING_004)]
    pub embedding_model: String,

    /// API key for the embedding service. Falls back to `GOOGLE_API_KEY`.
    #[arg(long, env = "PDFQA_EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    /// Embedding dimension, required for models whose dimension is not known.
    #[arg(long, env = "PDFQA_EMBEDDING_DIM")]
    pub embedding_dim: Option<usize>,
}

fn api_key(explicit: Option<&str>, fallback: &str, flag: &str) -> Result<String> {
    if let Some(key) = explicit.filter(|key| !key.is_empty()) {
        return Ok(key.to_string());
    }
    std::env::var(fallback)
        .ok()
        .filter(|key| !key.is_empty())
        .with_context(|| format!("Set {flag} or {fallback} in your environment"))
}

impl ChatArgs {
    /// Builds the chat client.
    pub fn create(&self, timeout: Duration) -> Result<OpenAI> {
        let key = api_key(self.chat_api_key.as_deref(), "GROQ_API_KEY", "PDFQA_CHAT_API_KEY")?;
        let client = OpenAI::builder(key)
            .base_url(&self.chat_base_url)
            .model(&self.chat_model)
            .temperature(self.temperature)
            .timeout(timeout)
            .build()?;
        Ok(client)
    }
}

impl EmbeddingArgs {
    /// Builds the embedding client.
    pub fn create(&self, timeout: Duration) -> Result<OpenAI> {
        let key = api_key(
            self.embedding_api_key.as_deref(),
            "GOOGLE_API_KEY",
            "PDFQA_EMBEDDING_API_KEY",
        )?;
        let mut builder = OpenAI::builder(key)
            .base_url(&self.embedding_base_url)
            .embedding_model(&self.embedding_model)
            .timeout(timeout);
        if let Some(dim) = self.embedding_dim {
            builder = builder.embedding_dimensions(dim);
        }
        Ok(builder.build()?)
    }
}
