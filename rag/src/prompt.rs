//! Prompt assembly for grounded answering.

use crate::error::{RagError, Result};
use crate::types::SearchResult;

const INPUT: &str = "{input}";
const CONTEXT: &str = "{context}";

/// Separator placed between retrieved chunks in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Default answering instructions.
pub const DEFAULT_TEMPLATE: &str = "\
You are a technical assistant answering questions about the user's uploaded documents.
Use the context below to answer the question.
- If the exact answer is not stated, reason from closely related passages, synonyms and \
alternative phrasings of the same idea.
- Treat differently worded questions with the same meaning as the same question.
- Answer in clear, concise sentences without extra formatting.
- If the message is small talk (for example \"Hi\" or \"How are you?\") or the context is \
empty, reply conversationally instead of searching the documents.

Question: {input}

Context:
{context}

Answer:";

/// Template with `{input}` and `{context}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Creates a template.
    ///
    /// # Errors
    /// [`RagError::InvalidConfiguration`] if either placeholder is missing.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [INPUT, CONTEXT] {
            if !template.contains(placeholder) {
                return Err(RagError::InvalidConfiguration(format!(
                    "prompt template is missing {placeholder}"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Substitutes the question and context in a single pass.
    ///
    /// Placeholder-like text inside the substituted values is left untouched.
    #[must_use]
    pub fn render(&self, question: &str, context: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + question.len() + context.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            if let Some(after) = tail.strip_prefix(INPUT) {
                out.push_str(question);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(CONTEXT) {
                out.push_str(context);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

/// Joins retrieved chunk texts in ranked order.
#[must_use]
pub fn assemble_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| result.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
