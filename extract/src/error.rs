use thiserror::Error;

/// Errors emitted while turning an uploaded file into text segments.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input is not a document format any registered extractor understands.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The input claims a known format but its content could not be decoded.
    #[error("failed to extract text: {0}")]
    Extraction(String),
    /// The source file could not be read from the filesystem.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
