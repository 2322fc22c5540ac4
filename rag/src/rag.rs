//! High-level RAG orchestrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use pdfqa_core::{EmbeddingModel, LanguageModel};
use pdfqa_extract::{ExtractorRegistry, SourceFile};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::{RagConfig, RagConfigBuilder};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::indexing::{IngestProgress, IngestStage, collect_files};
use crate::persistence::{Persistence, RkyvPersistence};
use crate::prompt::{PromptTemplate, assemble_context};
use crate::retry::{RetryConfig, with_retry};
use crate::types::{
    Answer, Chunk, FileFailure, IndexState, IngestionReport, IngestionStatus, ModelIdentity,
    SearchResult,
};

/// Message returned by [`Rag::ask`] when nothing has been ingested yet.
pub const INDEX_UNAVAILABLE_MESSAGE: &str =
    "Error: index does not exist. Please ingest documents first.";

/// Question-answering handle over one index directory.
///
/// Ingestion rebuilds the whole index from the given files and replaces the
/// persisted snapshot. Questions load the current snapshot, retrieve the most
/// similar chunks and hand them to the generator as context.
///
/// Provider calls run on the tokio runtime; extraction uses `spawn_blocking`.
pub struct Rag<M, G, P: Persistence = RkyvPersistence> {
    embedder: M,
    generator: G,
    extractors: Arc<ExtractorRegistry>,
    chunker: FixedSizeChunker,
    prompt: PromptTemplate,
    persistence: P,
    config: RagConfig,
    writer: Mutex<()>,
}

impl<M, G, P: Persistence> std::fmt::Debug for Rag<M, G, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rag")
            .field("extractors", &self.extractors)
            .field("chunker", &self.chunker)
            .field("persistence_path", &self.persistence.path())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<M, G> Rag<M, G>
where
    M: EmbeddingModel,
    G: LanguageModel,
{
    /// Creates a builder for custom configuration.
    pub fn builder(embedder: M, generator: G) -> RagBuilder<M, G> {
        RagBuilder::new(embedder, generator)
    }
}

impl<M, G, P> Rag<M, G, P>
where
    M: EmbeddingModel,
    G: LanguageModel,
    P: Persistence,
{
    /// Rebuilds the index from `files`, replacing any previous index.
    ///
    /// # Errors
    /// [`RagError::NoDocumentsProvided`] for an empty batch,
    /// [`RagError::IngestionFailed`] if no file could be read, and embedding or
    /// persistence failures. The previous index is untouched on error.
    pub async fn ingest(&self, files: Vec<SourceFile>) -> Result<IngestionReport> {
        self.ingest_with_progress(files, |_| {}).await
    }

    /// Ingests every file under `dir`, named by their path relative to `dir`.
    ///
    /// # Errors
    /// Same as [`Rag::ingest`], plus IO errors if `dir` itself cannot be scanned.
    /// Entries that cannot be read are reported in
    /// [`IngestionReport::failures`](crate::IngestionReport).
    pub async fn ingest_directory(&self, dir: impl AsRef<Path>) -> Result<IngestionReport> {
        self.ingest_directory_with_progress(dir, |_| {}).await
    }

    /// Ingests every file under `dir`, reporting progress.
    ///
    /// # Errors
    /// See [`Rag::ingest_directory`].
    pub async fn ingest_directory_with_progress<F>(
        &self,
        dir: impl AsRef<Path>,
        mut on_progress: F,
    ) -> Result<IngestionReport>
    where
        F: FnMut(IngestProgress),
    {
        let dir = dir.as_ref().to_path_buf();
        on_progress(IngestProgress::new(
            0,
            0,
            Some(dir.display().to_string()),
            IngestStage::Scanning,
        ));

        let (files, failures) = tokio::task::spawn_blocking(move || read_directory(&dir))
            .await
            .map_err(|err| RagError::Io(std::io::Error::other(err)))??;
        self.ingest_sources(files, failures, on_progress).await
    }

    /// Reads and ingests the files at `paths`, named by their final path component.
    ///
    /// Paths that cannot be read are reported as failures instead of aborting the
    /// batch.
    ///
    /// # Errors
    /// See [`Rag::ingest`].
    pub async fn ingest_paths_with_progress<F>(
        &self,
        paths: Vec<PathBuf>,
        on_progress: F,
    ) -> Result<IngestionReport>
    where
        F: FnMut(IngestProgress),
    {
        let (files, failures) = tokio::task::spawn_blocking(move || read_paths(&paths))
            .await
            .map_err(|err| RagError::Io(std::io::Error::other(err)))?;
        self.ingest_sources(files, failures, on_progress).await
    }

    /// Rebuilds the index from `files`, reporting progress.
    ///
    /// # Errors
    /// See [`Rag::ingest`].
    pub async fn ingest_with_progress<F>(
        &self,
        files: Vec<SourceFile>,
        on_progress: F,
    ) -> Result<IngestionReport>
    where
        F: FnMut(IngestProgress),
    {
        self.ingest_sources(files, Vec::new(), on_progress).await
    }

    async fn ingest_sources<F>(
        &self,
        files: Vec<SourceFile>,
        mut failures: Vec<FileFailure>,
        mut on_progress: F,
    ) -> Result<IngestionReport>
    where
        F: FnMut(IngestProgress),
    {
        if files.is_empty() && failures.is_empty() {
            return Err(RagError::NoDocumentsProvided);
        }

        let _writer = self.writer.lock().await;
        let total = files.len() + failures.len();
        on_progress(IngestProgress::new(0, total, None, IngestStage::Extracting));

        for (position, failure) in failures.iter().enumerate() {
            warn!(file = %failure.filename, error = %failure.reason, "skipping unreadable file");
            on_progress(IngestProgress::new(
                position + 1,
                total,
                Some(failure.filename.clone()),
                IngestStage::Skipped {
                    reason: failure.reason.clone(),
                },
            ));
        }
        let skipped = failures.len();

        let outcomes: Vec<(String, Result<Vec<Chunk>>)> = stream::iter(files)
            .map(|file| self.extract_and_chunk(file))
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut filenames = Vec::new();
        let mut chunks = Vec::new();

        for (position, (filename, outcome)) in outcomes.into_iter().enumerate() {
            let stage = match outcome {
                Ok(file_chunks) => {
                    debug!(file = %filename, chunks = file_chunks.len(), "file chunked");
                    let stage = IngestStage::Chunked {
                        chunks: file_chunks.len(),
                    };
                    chunks.extend(file_chunks);
                    filenames.push(filename.clone());
                    stage
                }
                Err(err) => {
                    warn!(file = %filename, error = %err, "skipping file");
                    let reason = err.to_string();
                    failures.push(FileFailure::new(filename.clone(), reason.clone()));
                    IngestStage::Skipped { reason }
                }
            };
            on_progress(IngestProgress::new(
                skipped + position + 1,
                total,
                Some(filename),
                stage,
            ));
        }

        if filenames.is_empty() {
            return Err(RagError::IngestionFailed { failures });
        }

        on_progress(IngestProgress::new(
            total,
            total,
            None,
            IngestStage::Embedding {
                chunks: chunks.len(),
            },
        ));

        let embeddings: Vec<Vec<f32>> = stream::iter(chunks.iter())
            .map(|chunk| self.embed(&chunk.text))
            .buffered(self.config.concurrency)
            .try_collect()
            .await?;

        let index = VectorIndex::build(ModelIdentity::of(&self.embedder), chunks, embeddings)?;

        on_progress(IngestProgress::new(total, total, None, IngestStage::Saving));
        self.persistence.save(&index)?;

        info!(
            files = filenames.len(),
            failed = failures.len(),
            chunks = index.len(),
            model = %index.identity(),
            "index rebuilt"
        );
        on_progress(IngestProgress::new(total, total, None, IngestStage::Done));

        let status = if failures.is_empty() {
            IngestionStatus::Complete
        } else {
            IngestionStatus::Partial
        };

        Ok(IngestionReport {
            status,
            filenames,
            total_chunks: index.len(),
            failures,
        })
    }

    /// Retrieves the chunks most similar to `question`.
    ///
    /// # Errors
    /// [`RagError::IndexUnavailable`] before the first ingestion,
    /// [`RagError::ModelMismatch`] if the index was built by another model, and
    /// provider failures.
    pub async fn search(&self, question: &str) -> Result<Vec<SearchResult>> {
        let index = self.current_index()?;
        let query = self.embed(question).await?;
        index.search(&query, self.config.top_k, self.config.similarity_threshold)
    }

    /// Answers `question` from the indexed documents.
    ///
    /// The generator is called even when nothing relevant was retrieved, so small talk
    /// still gets a reply.
    ///
    /// # Errors
    /// Same as [`Rag::search`], plus generation failures.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let sources = self.search(question).await?;
        let context = assemble_context(&sources);
        let prompt = self.prompt.render(question, &context);

        let text = with_retry(
            &self.config.retry,
            self.config.provider_timeout,
            "generation",
            || self.generator.generate(&prompt),
        )
        .await?;

        info!(
            sources = sources.len(),
            generator = self.generator.name(),
            "answer generated"
        );

        Ok(Answer {
            question: question.to_string(),
            context,
            text,
            sources,
        })
    }

    /// Answers `question`, returning [`INDEX_UNAVAILABLE_MESSAGE`] when nothing has
    /// been ingested.
    ///
    /// # Errors
    /// Every failure of [`Rag::answer`] other than a missing index.
    pub async fn ask(&self, question: &str) -> Result<String> {
        match self.answer(question).await {
            Ok(answer) => Ok(answer.text),
            Err(RagError::IndexUnavailable) => Ok(INDEX_UNAVAILABLE_MESSAGE.to_string()),
            Err(err) => Err(err),
        }
    }

    /// Reports the lifecycle state of the index.
    ///
    /// # Errors
    /// Fails if a persisted index cannot be read.
    pub fn status(&self) -> Result<IndexState> {
        if self.writer.try_lock().is_err() {
            return Ok(IndexState::Building);
        }
        if !self.persistence.exists() {
            return Ok(IndexState::Empty);
        }
        let index = self.persistence.load()?;
        Ok(IndexState::Ready {
            chunks: index.len(),
            identity: index.identity().clone(),
        })
    }

    /// Deletes the persisted index. Returns `false` if there was none.
    ///
    /// # Errors
    /// Fails if the index file cannot be removed.
    pub async fn purge(&self) -> Result<bool> {
        let _writer = self.writer.lock().await;
        let removed = self.persistence.remove()?;
        if removed {
            info!(path = %self.persistence.path().display(), "index purged");
        }
        Ok(removed)
    }

    /// Returns configuration.
    pub const fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Returns the persistence backend.
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Returns the embedding model.
    pub const fn embedder(&self) -> &M {
        &self.embedder
    }

    /// Returns the generation model.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    fn current_index(&self) -> Result<VectorIndex> {
        if !self.persistence.exists() {
            return Err(RagError::IndexUnavailable);
        }
        let index = match self.persistence.load() {
            Ok(index) => index,
            // Purged between the check and the read.
            Err(RagError::IndexNotFound(_)) => return Err(RagError::IndexUnavailable),
            Err(err) => return Err(err),
        };

        let current = ModelIdentity::of(&self.embedder);
        if *index.identity() != current {
            return Err(RagError::ModelMismatch {
                persisted: index.identity().to_string(),
                current: current.to_string(),
            });
        }
        Ok(index)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        with_retry(
            &self.config.retry,
            self.config.provider_timeout,
            "embedding",
            || self.embedder.embed(text),
        )
        .await
    }

    async fn extract_and_chunk(&self, file: SourceFile) -> (String, Result<Vec<Chunk>>) {
        let name = file.name.clone();
        let extractors = Arc::clone(&self.extractors);
        let chunker = self.chunker;

        let outcome = tokio::task::spawn_blocking(move || -> Result<Vec<Chunk>> {
            let segments = extractors.extract(&file)?;
            chunker.split(&file.name, &segments)
        })
        .await
        .unwrap_or_else(|err| {
            Err(RagError::Extraction(format!(
                "extraction task failed: {err}"
            )))
        });

        (name, outcome)
    }
}

type Sources = (Vec<SourceFile>, Vec<FileFailure>);

fn read_directory(dir: &Path) -> Result<Sources> {
    let scan = collect_files(dir)?;
    let mut failures: Vec<FileFailure> = scan
        .unreadable
        .into_iter()
        .map(|(path, err)| FileFailure::new(relative_name(dir, &path), err.to_string()))
        .collect();

    let mut files = Vec::with_capacity(scan.files.len());
    for path in scan.files {
        let name = relative_name(dir, &path);
        match SourceFile::read(&path) {
            Ok(mut file) => {
                file.name = name;
                files.push(file);
            }
            Err(err) => failures.push(FileFailure::new(name, err.to_string())),
        }
    }
    Ok((files, failures))
}

fn read_paths(paths: &[PathBuf]) -> Sources {
    let mut files = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match SourceFile::read(path) {
            Ok(file) => files.push(file),
            Err(err) => failures.push(FileFailure::new(path.display().to_string(), err.to_string())),
        }
    }
    (files, failures)
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Builder for configuring a [`Rag`] instance.
pub struct RagBuilder<M, G> {
    embedder: M,
    generator: G,
    config_builder: RagConfigBuilder,
    extractors: ExtractorRegistry,
    prompt_template: Option<String>,
}

impl<M, G> std::fmt::Debug for RagBuilder<M, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagBuilder")
            .field("config_builder", &self.config_builder)
            .field("extractors", &self.extractors)
            .finish_non_exhaustive()
    }
}

impl<M, G> RagBuilder<M, G>
where
    M: EmbeddingModel,
    G: LanguageModel,
{
    fn new(embedder: M, generator: G) -> Self {
        Self {
            embedder,
            generator,
            config_builder: RagConfigBuilder::new(),
            extractors: ExtractorRegistry::default(),
            prompt_template: None,
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config_builder = RagConfigBuilder::from(config);
        self
    }

    /// Sets the index directory.
    #[must_use]
    pub fn index_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.index_dir(path);
        self
    }

    /// Sets chunk size and overlap, in characters.
    #[must_use]
    pub fn chunking(mut self, chunk_size: usize, overlap: usize) -> Self {
        self.config_builder = self.config_builder.chunking(chunk_size, overlap);
        self
    }

    /// Sets the number of chunks retrieved per question.
    #[must_use]
    pub fn top_k(mut self, k: usize) -> Self {
        self.config_builder = self.config_builder.top_k(k);
        self
    }

    /// Sets the minimum similarity threshold.
    #[must_use]
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config_builder = self.config_builder.similarity_threshold(threshold);
        self
    }

    /// Sets the ingestion concurrency bound.
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config_builder = self.config_builder.concurrency(concurrency);
        self
    }

    /// Sets the per-call provider timeout.
    #[must_use]
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.provider_timeout(timeout);
        self
    }

    /// Sets the provider retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(retry);
        self
    }

    /// Uses a custom extractor registry.
    #[must_use]
    pub fn extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }

    /// Uses a custom prompt with `{input}` and `{context}` placeholders.
    #[must_use]
    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Builds the [`Rag`] instance persisting to the configured index directory.
    ///
    /// # Errors
    /// [`RagError::InvalidConfiguration`] for out-of-range settings.
    pub fn build(mut self) -> Result<Rag<M, G, RkyvPersistence>> {
        let config = self.config_builder.build();
        let persistence = RkyvPersistence::new(&config.index_dir);
        self.config_builder = RagConfigBuilder::from(config);
        self.build_with_persistence(persistence)
    }

    /// Builds the [`Rag`] instance using a provided persistence backend.
    ///
    /// The configured index directory is ignored in favour of the backend's location.
    ///
    /// # Errors
    /// [`RagError::InvalidConfiguration`] for out-of-range settings.
    pub fn build_with_persistence<P: Persistence>(self, persistence: P) -> Result<Rag<M, G, P>> {
        let config = self.config_builder.build();
        config.validate()?;
        let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?;
        let prompt = match self.prompt_template {
            Some(template) => PromptTemplate::new(template)?,
            None => PromptTemplate::default(),
        };

        Ok(Rag {
            embedder: self.embedder,
            generator: self.generator,
            extractors: Arc::new(self.extractors),
            chunker,
            prompt,
            persistence,
            config,
            writer: Mutex::new(()),
        })
    }
}
