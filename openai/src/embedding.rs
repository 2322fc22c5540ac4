use crate::{
    client::{Config, OpenAI},
    error::OpenAIError,
    request::EmbeddingRequest,
    response::EmbeddingResponse,
};
use pdfqa_core::{EmbeddingModel, Result as CoreResult};
use std::sync::Arc;

impl EmbeddingModel for OpenAI {
    fn dim(&self) -> usize {
        self.config().embedding_dimensions
    }

    fn model_id(&self) -> &str {
        self.embedding_model()
    }

    fn embed(&self, text: &str) -> impl core::future::Future<Output = CoreResult<Vec<f32>>> + Send {
        let cfg = self.config();
        let input = text.to_owned();
        async move {
            let vector = embed_once(cfg, input).await?;
            Ok(vector)
        }
    }
}

async fn embed_once(cfg: Arc<Config>, input: String) -> Result<Vec<f32>, OpenAIError> {
    let request = EmbeddingRequest {
        model: &cfg.embedding_model,
        input: &input,
        dimensions: cfg.send_dimensions.then_some(cfg.embedding_dimensions),
    };
    let response: EmbeddingResponse = cfg.post_json("/embeddings", &request).await?;
    let vector = response.into_vector()?;
    if vector.len() != cfg.embedding_dimensions {
        return Err(OpenAIError::Dimension {
            expected: cfg.embedding_dimensions,
            actual: vector.len(),
        });
    }
    Ok(vector)
}
