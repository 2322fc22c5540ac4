//! PDF text extraction built on `lopdf`.

use lopdf::Document;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::model::{DocumentMeta, PdfOptions, SourceFile};
use crate::Extractor;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// Writers may prepend junk before the header; readers scan the first kilobyte.
const MAGIC_SCAN_WINDOW: usize = 1024;

/// Extracts one text segment per page, in page order.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    options: PdfOptions,
}

impl PdfExtractor {
    /// Creates an extractor reading every page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with custom options.
    #[must_use]
    pub const fn with_options(options: PdfOptions) -> Self {
        Self { options }
    }

    /// Reads the document information dictionary.
    ///
    /// # Errors
    /// Same conditions as [`Extractor::extract`].
    pub fn metadata(&self, file: &SourceFile) -> Result<DocumentMeta> {
        let doc = load(&file.bytes)?;
        Ok(extract_metadata(&doc))
    }
}

impl Extractor for PdfExtractor {
    fn extract(&self, file: &SourceFile) -> Result<Vec<String>> {
        let doc = load(&file.bytes)?;
        let pages = extract_pages(&doc, &self.options);
        debug!(file = %file.name, pages = pages.len(), "extracted pdf text");
        Ok(pages)
    }

    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn sniff(&self, bytes: &[u8]) -> bool {
        looks_like_pdf(bytes)
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_SCAN_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}

fn load(bytes: &[u8]) -> Result<Document> {
    if !looks_like_pdf(bytes) {
        return Err(ExtractError::UnsupportedFormat(
            "missing %PDF- header".to_string(),
        ));
    }
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Extraction(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(ExtractError::Extraction(
            "encrypted documents are not supported".to_string(),
        ));
    }
    Ok(doc)
}

fn extract_pages(doc: &Document, options: &PdfOptions) -> Vec<String> {
    let page_map = doc.get_pages();
    let mut page_numbers: Vec<u32> = page_map.keys().copied().collect();
    page_numbers.sort_unstable();

    select_pages(&page_numbers, options.page_range.clone())
        .into_iter()
        .map(|page_number| {
            // A page lopdf cannot decode yields an empty segment rather than failing the file.
            let raw = doc.extract_text(&[page_number]).unwrap_or_else(|err| {
                debug!(page = page_number, error = %err, "page text extraction failed");
                String::new()
            });
            normalize_text(&raw)
        })
        .collect()
}

fn select_pages(pages: &[u32], range: Option<std::ops::RangeInclusive<usize>>) -> Vec<u32> {
    match range {
        None => pages.to_vec(),
        Some(range) => pages
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| range.contains(&(idx + 1)).then_some(*p))
            .collect(),
    }
}

pub(crate) fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_metadata(doc: &Document) -> DocumentMeta {
    let info = doc
        .trailer
        .get(b"Info")
        .and_then(lopdf::Object::as_reference)
        .and_then(|id| doc.get_dictionary(id));

    let Ok(dict) = info else {
        return DocumentMeta::default();
    };

    let field = |key: &[u8]| {
        dict.get(key)
            .and_then(lopdf::Object::as_str)
            .ok()
            .map(to_clean_string)
    };

    DocumentMeta {
        title: field(b"Title"),
        author: field(b"Author"),
        creation_date: field(b"CreationDate"),
    }
}

fn to_clean_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Builds a PDF with one line of Courier text per page.
    pub(crate) fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![50.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
