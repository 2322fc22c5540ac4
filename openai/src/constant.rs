//! Model & endpoint constants
//!
//! Well-known OpenAI-compatible base URLs plus the chat and embedding models that
//! work well for document question answering. Any other model name can be passed
//! as a plain string.

/// Default `OpenAI` API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// [Groq](https://console.groq.com/docs/openai)'s OpenAI-compatible base URL.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Google Gemini's OpenAI-compatible base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

// ============================================================
// Chat models
// ============================================================

/// Small, inexpensive `OpenAI` chat model.
pub const GPT4O_MINI: &str = "gpt-4o-mini";
/// Gemma 2 9B instruction-tuned, served by Groq.
pub const GEMMA2_9B_IT: &str = "gemma2-9b-it";
/// Llama 3.1 8B, served by Groq with low latency.
pub const LLAMA3_1_8B_INSTANT: &str = "llama-3.1-8b-instant";

// ============================================================
// Embedding models
// ============================================================

/// `OpenAI` small embedding model (1536 dims).
pub const EMBEDDING_SMALL: &str = "text-embedding-3-small";
/// `OpenAI` large embedding model (3072 dims).
pub const EMBEDDING_LARGE: &str = "text-embedding-3-large";
/// Gemini text embedding model (768 dims).
pub const GEMINI_TEXT_EMBEDDING_004: &str = "text-embedding-004";
/// Gemini embedding model (3072 dims).
pub const GEMINI_EMBEDDING_001: &str = "gemini-embedding-001";
