#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pdfqa_rag::{EmbeddingModel, LanguageModel};

pub const DIM: usize = 256;

/// Bag-of-words embedder: each lower-cased token bumps one hashed bucket.
#[derive(Debug, Default)]
pub struct HashEmbedder {
    pub calls: AtomicUsize,
}

pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

pub fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; DIM];
    for token in tokens(text) {
        let bucket = usize::try_from(fnv1a(token.as_bytes()) % DIM as u64).unwrap();
        vector[bucket] += 1.0;
    }
    vector
}

impl EmbeddingModel for HashEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn model_id(&self) -> &str {
        "hash-bow"
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(embed_text(text))
    }
}

/// Fails the first `failures` calls, then behaves like [`HashEmbedder`].
#[derive(Debug)]
pub struct FlakyEmbedder {
    pub failures: usize,
    pub calls: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

impl EmbeddingModel for FlakyEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn model_id(&self) -> &str {
        "hash-bow"
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            anyhow::bail!("429 too many requests");
        }
        Ok(embed_text(text))
    }
}

/// Answers with the context sentence sharing the most tokens with the question,
/// greets when the context is empty, and records every prompt.
#[derive(Debug, Default, Clone)]
pub struct ExtractiveGenerator {
    pub prompts: Arc<Mutex<Vec<String>>>,
}

pub const GREETING: &str = "Hello! Ask me anything about your documents.";

fn section<'a>(prompt: &'a str, start: &str, end: &str) -> &'a str {
    let from = prompt.find(start).map_or(0, |i| i + start.len());
    let rest = &prompt[from..];
    rest.find(end).map_or(rest, |i| &rest[..i])
}

impl ExtractiveGenerator {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LanguageModel for ExtractiveGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let question = section(prompt, "Question: ", "\n");
        let context = section(prompt, "Context:\n", "\n\nAnswer:");
        if context.trim().is_empty() {
            return Ok(GREETING.to_string());
        }

        let wanted: Vec<String> = tokens(question).collect();
        let best = context
            .split(['.', '\n'])
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .max_by_key(|sentence| tokens(sentence).filter(|t| wanted.contains(t)).count())
            .unwrap_or_default();
        Ok(format!("{best}."))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

/// Always fails.
#[derive(Debug, Default)]
pub struct DownGenerator {
    pub calls: AtomicUsize,
}

impl LanguageModel for DownGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("503 service unavailable")
    }
}

/// Builds a PDF with one line of Courier text per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
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
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap();
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
