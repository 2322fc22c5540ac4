//! Configuration for RAG.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RagError, Result};
use crate::retry::RetryConfig;

/// Configuration for a RAG instance.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Directory holding the persisted index.
    pub index_dir: PathBuf,
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of a segment.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Minimum similarity score for retrieved chunks.
    pub similarity_threshold: f32,
    /// Bound on concurrent extractions and concurrent embedding calls.
    pub concurrency: usize,
    /// Limit for a single provider call.
    pub provider_timeout: Duration,
    /// Backoff policy for provider calls.
    pub retry: RetryConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./db"),
            chunk_size: 1000,
            chunk_overlap: 50,
            top_k: 5,
            similarity_threshold: 0.1,
            concurrency: 4,
            provider_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

impl RagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }

    /// Checks settings that are not covered by the chunker itself.
    ///
    /// # Errors
    /// [`RagError::InvalidConfiguration`] for a zero concurrency or timeout, or a
    /// threshold outside `[-1, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(RagError::InvalidConfiguration(
                "concurrency must be at least 1".into(),
            ));
        }
        if self.provider_timeout.is_zero() {
            return Err(RagError::InvalidConfiguration(
                "provider timeout must be positive".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RagError::InvalidConfiguration(format!(
                "similarity threshold {} is outside [-1, 1]",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Builder for RAG configuration.
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl From<RagConfig> for RagConfigBuilder {
    fn from(config: RagConfig) -> Self {
        Self { config }
    }
}

impl RagConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the index directory.
    #[must_use]
    pub fn index_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_dir = path.into();
        self
    }

    /// Sets chunk size and overlap, in characters.
    #[must_use]
    pub const fn chunking(mut self, chunk_size: usize, overlap: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self.config.chunk_overlap = overlap;
        self
    }

    /// Sets the number of chunks retrieved per question.
    #[must_use]
    pub const fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Sets the minimum similarity threshold for retrieval.
    #[must_use]
    pub const fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Sets the ingestion concurrency bound.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Sets the per-call provider timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.config.provider_timeout = timeout;
        self
    }

    /// Sets the provider retry policy.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}
