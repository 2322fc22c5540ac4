use std::{sync::Arc, time::Duration};

use pdfqa_core::LanguageModel;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL,
    GEMINI_BASE_URL, GEMINI_TEXT_EMBEDDING_004, GEMMA2_9B_IT, GROQ_BASE_URL,
    error::OpenAIError,
    request::{ChatCompletionRequest, ChatMessagePayload},
    response::{ChatCompletionResponse, error_message},
};

/// Client for any `OpenAI`-compatible `/chat/completions` and `/embeddings` API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct OpenAI {
    inner: Arc<Config>,
}

impl OpenAI {
    /// Creates a client for the `OpenAI` API with default models.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OpenAIError> {
        Self::builder(api_key).build()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> Builder {
        Builder::new(api_key)
    }

    /// Builder preset for Groq-hosted chat models.
    #[must_use]
    pub fn groq(api_key: impl Into<String>) -> Builder {
        Builder::new(api_key)
            .base_url(GROQ_BASE_URL)
            .model(GEMMA2_9B_IT)
    }

    /// Builder preset for Gemini through its `OpenAI`-compatible endpoint.
    #[must_use]
    pub fn gemini(api_key: impl Into<String>) -> Builder {
        Builder::new(api_key)
            .base_url(GEMINI_BASE_URL)
            .embedding_model(GEMINI_TEXT_EMBEDDING_004)
    }

    /// Chat model used by [`LanguageModel::generate`].
    #[must_use]
    pub fn chat_model(&self) -> &str {
        &self.inner.chat_model
    }

    /// Embedding model used by [`pdfqa_core::EmbeddingModel::embed`].
    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.inner.embedding_model
    }

    pub(crate) fn config(&self) -> Arc<Config> {
        self.inner.clone()
    }
}

impl LanguageModel for OpenAI {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl core::future::Future<Output = pdfqa_core::Result<String>> + Send {
        let cfg = self.config();
        let prompt = prompt.to_owned();
        async move {
            let text = complete(&cfg, &prompt).await?;
            Ok(text)
        }
    }

    fn name(&self) -> &str {
        &self.inner.chat_model
    }
}

async fn complete(cfg: &Config, prompt: &str) -> Result<String, OpenAIError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &cfg.system_prompt {
        messages.push(ChatMessagePayload::system(system));
    }
    messages.push(ChatMessagePayload::user(prompt));

    let request = ChatCompletionRequest {
        model: &cfg.chat_model,
        messages,
        stream: false,
        temperature: cfg.temperature,
        max_tokens: cfg.max_tokens,
    };
    let response: ChatCompletionResponse = cfg.post_json("/chat/completions", &request).await?;
    response.into_text()
}

/// Builder for [`OpenAI`].
#[derive(Debug)]
pub struct Builder {
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimensions: usize,
    send_dimensions: bool,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    organization: Option<String>,
    request_timeout: Duration,
}

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

impl Builder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIM,
            send_dimensions: false,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            organization: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Select the chat model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = sanitize_model(model);
        self
    }

    /// Select the embeddings model identifier.
    ///
    /// The vector dimension is inferred for well-known models.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        let model = sanitize_model(model);
        if let Some(dim) = infer_embedding_dim(&model) {
            self.embedding_dimensions = dim;
        }
        self.embedding_model = model;
        self
    }

    /// Override the embedding vector dimension.
    ///
    /// The value is also sent as the `dimensions` request field, which asks
    /// models that support it to shorten their vectors.
    #[must_use]
    pub const fn embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self.send_dimensions = true;
        self
    }

    /// Prepend a system message to every completion.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Upper bound on generated tokens.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Provide an optional organization header for enterprise accounts.
    #[must_use]
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Set the per-request timeout enforced by the HTTP client.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Finalize the builder and create an [`OpenAI`] client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn build(self) -> Result<OpenAI, OpenAIError> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("pdfqa-openai/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(OpenAI {
            inner: Arc::new(Config {
                api_key: self.api_key,
                base_url: self.base_url,
                chat_model: self.chat_model,
                embedding_model: self.embedding_model,
                embedding_dimensions: self.embedding_dimensions,
                send_dimensions: self.send_dimensions,
                system_prompt: self.system_prompt,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                organization: self.organization,
                http,
            }),
        })
    }
}

#[derive(Debug)]
pub(crate) struct Config {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub send_dimensions: bool,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub organization: Option<String>,
    http: reqwest::Client,
}

impl Config {
    pub(crate) fn request_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn request_auth(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Posts `body` as JSON and decodes a successful response.
    ///
    /// Non-2xx statuses become [`OpenAIError::Api`] carrying the server's message.
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, OpenAIError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.request_url(path);
        debug!(%url, "sending request");

        let mut request = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.request_auth())
            .json(body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = OpenAIError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            };
            if err.is_transient() {
                warn!(%url, status = status.as_u16(), "transient API failure");
            } else {
                debug!(%url, status = status.as_u16(), "API request rejected");
            }
            return Err(err);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn sanitize_model(model: impl Into<String>) -> String {
    model.into().trim().to_string()
}

fn infer_embedding_dim(model: &str) -> Option<usize> {
    match model.strip_prefix("models/").unwrap_or(model) {
        "text-embedding-3-large" | "gemini-embedding-001" => Some(3072),
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-004" | "embedding-001" => Some(768),
        _ => None,
    }
}
