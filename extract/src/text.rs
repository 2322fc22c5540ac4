//! Plain-text extraction.

use crate::Extractor;
use crate::error::{ExtractError, Result};
use crate::model::SourceFile;

const FORM_FEED: char = '\u{000C}';

/// Treats UTF-8 text files as documents, one segment per form-feed separated page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Creates a plain-text extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Extractor for PlainTextExtractor {
    fn extract(&self, file: &SourceFile) -> Result<Vec<String>> {
        let text = std::str::from_utf8(&file.bytes)
            .map_err(|e| ExtractError::Extraction(format!("{}: {e}", file.name)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let text = text.replace("\r\n", "\n");

        Ok(text.split(FORM_FEED).map(str::to_string).collect())
    }

    fn name(&self) -> &'static str {
        "text"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "md", "markdown"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_file_is_one_segment() {
        let file = SourceFile::new("a.txt", "line one\r\nline two");
        let segments = PlainTextExtractor.extract(&file).unwrap();
        assert_eq!(segments, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn form_feed_splits_pages() {
        let file = SourceFile::new("a.txt", "\u{feff}page one\u{000C}page two");
        let segments = PlainTextExtractor.extract(&file).unwrap();
        assert_eq!(segments, vec!["page one".to_string(), "page two".to_string()]);
    }

    #[test]
    fn invalid_utf8_is_extraction_error() {
        let file = SourceFile::new("bad.txt", vec![0xff, 0xfe, 0x00]);
        let err = PlainTextExtractor.extract(&file).unwrap_err();
        assert!(matches!(err, ExtractError::Extraction(_)));
    }
}
