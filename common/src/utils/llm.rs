use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use crate::error::AppError;

/// Single prompt in, single completion out. No retries at this layer.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AppError>;
}

pub struct OpenAICompletion {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAICompletion {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAICompletion {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(temperature)
            .messages([ChatCompletionRequestUserMessage::from(prompt).into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::GenerationMalformed("No content found in LLM response".into())
            })?;

        debug!(
            model = %self.model,
            completion_chars = content.chars().count(),
            "completion received"
        );

        Ok(content.trim().to_string())
    }
}
