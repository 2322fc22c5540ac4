use thiserror::Error;

/// Errors that can arise when calling an OpenAI-compatible API.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Transport failures, including request timeouts.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),
    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the server, or the raw body.
        message: String,
    },
    /// The response was well-formed but lacked the expected payload.
    #[error("malformed response: {0}")]
    MissingData(&'static str),
    /// The returned embedding has an unexpected length.
    #[error("embedding has {actual} dimensions, expected {expected}")]
    Dimension {
        /// Configured dimension.
        expected: usize,
        /// Dimension returned by the server.
        actual: usize,
    },
}

impl OpenAIError {
    /// Returns `true` for rate limiting and server-side failures.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Json(_) | Self::MissingData(_) | Self::Dimension { .. } => false,
        }
    }
}
