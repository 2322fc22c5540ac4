use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: Vec<ChatMessagePayload<'a>>,
    pub(crate) stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessagePayload<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

impl<'a> ChatMessagePayload<'a> {
    pub(crate) const fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    pub(crate) const fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dimensions: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_omitted() {
        let request = ChatCompletionRequest {
            model: "gemma2-9b-it",
            messages: vec![ChatMessagePayload::user("hi")],
            stream: false,
            temperature: None,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gemma2-9b-it",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false,
            })
        );

        let embedding = EmbeddingRequest {
            model: "text-embedding-004",
            input: "text",
            dimensions: Some(256),
        };
        assert_eq!(serde_json::to_value(&embedding).unwrap()["dimensions"], 256);
    }
}
