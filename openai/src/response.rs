use serde::Deserialize;

use crate::error::OpenAIError;

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    pub(crate) fn into_text(self) -> Result<String, OpenAIError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(MessageContent::into_text)
            .ok_or(OpenAIError::MissingData("chat response has no message content"))
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Blocks(blocks) => blocks.into_iter().filter_map(|block| block.text).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingItem>,
}

impl EmbeddingResponse {
    pub(crate) fn into_vector(self) -> Result<Vec<f32>, OpenAIError> {
        self.data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or(OpenAIError::MissingData("embedding response missing vector data"))
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts `error.message` from an error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| body.trim().to_string(),
        |envelope| envelope.error.message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_text_and_blocks() {
        let text: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"It expires in 2026."}}]}"#,
        )
        .unwrap();
        assert_eq!(text.into_text().unwrap(), "It expires in 2026.");

        let blocks: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":[{"type":"text","text":"a"},{"type":"text","text":"b"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(blocks.into_text().unwrap(), "ab");
    }

    #[test]
    fn empty_choices_rejected() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(OpenAIError::MissingData(_))
        ));
    }

    #[test]
    fn embedding_vector_extracted() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[0.5,-0.25],"index":0}]}"#).unwrap();
        assert_eq!(response.into_vector().unwrap(), vec![0.5, -0.25]);
    }

    #[test]
    fn error_message_parsing() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#),
            "Invalid API Key"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
