//! Adapter for any `edgequake-llm` provider.

use super::{EvaluationProvider, EvaluationRequest, ProviderResponse};
use crate::error::HireMeterError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;

/// Runs an evaluation as a chat: the instruction is the system turn, the
/// job description and page image are one user turn.
pub struct EdgequakeProvider {
    inner: Arc<dyn LLMProvider>,
    name: String,
    model: String,
}

impl EdgequakeProvider {
    pub fn new(inner: Arc<dyn LLMProvider>, name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl EvaluationProvider for EdgequakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &EvaluationRequest) -> Result<ProviderResponse, HireMeterError> {
        let messages = build_messages(request);
        let options = build_options(request);

        let response = self
            .inner
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| HireMeterError::ProviderFailed {
                provider: self.name.clone(),
                message: format!("{}", e),
            })?;

        Ok(ProviderResponse {
            text: response.content,
            input_tokens: Some(response.prompt_tokens as u64),
            output_tokens: Some(response.completion_tokens as u64),
        })
    }
}

fn build_messages(request: &EvaluationRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(request.instruction.as_str()),
        ChatMessage::user_with_images(
            request.context.as_str(),
            vec![request.payload.to_image_data()],
        ),
    ]
}

fn build_options(request: &EvaluationRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        ..Default::default()
    }
}
