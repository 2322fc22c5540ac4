//! Document text extraction for the question-answering pipeline.
//!
//! An [`Extractor`] turns an uploaded [`SourceFile`] into ordered plain-text segments
//! (one per page for PDFs). Empty segments are legal output: a scanned page without a
//! text layer simply contributes nothing downstream.
//!
//! [`ExtractorRegistry`] picks the extractor for a file by extension, falling back to
//! content sniffing, and reports [`ExtractError::UnsupportedFormat`] when nothing matches.

mod error;
mod model;
mod pdf;
mod text;

pub use error::{ExtractError, Result};
pub use model::{DocumentMeta, PdfOptions, SourceFile};
pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

use std::sync::Arc;

/// Turns a raw document into ordered text segments.
///
/// Implementations must be free of side effects beyond reading their input.
pub trait Extractor: Send + Sync {
    /// Extracts text segments in reading order.
    ///
    /// # Errors
    /// [`ExtractError::UnsupportedFormat`] if the bytes are not this extractor's format,
    /// [`ExtractError::Extraction`] if the content is corrupt.
    fn extract(&self, file: &SourceFile) -> Result<Vec<String>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Lower-case file extensions handled by this extractor.
    fn extensions(&self) -> &'static [&'static str];

    /// Returns `true` when the bytes look like this extractor's format.
    fn sniff(&self, _bytes: &[u8]) -> bool {
        false
    }
}

/// Registry of extractors, dispatching on file extension then content.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field(
                "extractors",
                &self.extractors.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ExtractorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registers an extractor. Later registrations win on extension clashes.
    pub fn register(&mut self, extractor: impl Extractor + 'static) {
        self.extractors.insert(0, Arc::new(extractor));
    }

    /// Finds the extractor responsible for `file`.
    #[must_use]
    pub fn for_file(&self, file: &SourceFile) -> Option<&dyn Extractor> {
        let by_extension = file.extension().and_then(|ext| {
            self.extractors
                .iter()
                .find(|e| e.extensions().contains(&ext.as_str()))
        });

        by_extension
            .or_else(|| self.extractors.iter().find(|e| e.sniff(&file.bytes)))
            .map(|extractor| &**extractor)
    }

    /// Extracts text segments from `file` with the matching extractor.
    ///
    /// # Errors
    /// [`ExtractError::UnsupportedFormat`] when no extractor claims the file, otherwise
    /// whatever the selected extractor reports.
    pub fn extract(&self, file: &SourceFile) -> Result<Vec<String>> {
        let extractor = self.for_file(file).ok_or_else(|| {
            ExtractError::UnsupportedFormat(format!(
                "no extractor for {} (extension {:?})",
                file.name,
                file.extension().unwrap_or_default()
            ))
        })?;
        extractor.extract(file)
    }
}

impl Default for ExtractorRegistry {
    /// PDF and plain text.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(PlainTextExtractor::new());
        registry.register(PdfExtractor::new());
        registry
    }
}
