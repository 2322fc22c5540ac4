use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;

/// An uploaded document: its file name, raw bytes and the time it was received.
///
/// The bytes are only needed until the document has been split into chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name, used as the document identifier.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Ingestion timestamp.
    pub received_at: SystemTime,
}

impl SourceFile {
    /// Wraps in-memory bytes, stamping the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            received_at: SystemTime::now(),
        }
    }

    /// Reads a file from disk, naming it after its final path component.
    ///
    /// # Errors
    /// Returns [`ExtractError::Io`](crate::ExtractError::Io) if the file cannot be read.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Self::new(name, bytes))
    }

    /// Lower-cased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

/// Runtime options for PDF extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfOptions {
    /// Optional inclusive 1-based page range.
    pub page_range: Option<RangeInclusive<usize>>,
}

/// Minimal PDF metadata from the document information dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Optional title.
    pub title: Option<String>,
    /// Optional author.
    pub author: Option<String>,
    /// Optional raw creation date string.
    pub creation_date: Option<String>,
}
