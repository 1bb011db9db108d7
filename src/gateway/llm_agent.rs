//! Agent gateway backed by an [`LlmProvider`]

use super::{AgentGateway, FragmentStream, GatewayError};
use crate::llm::{CompletionRequest, FinishReason, LlmProvider, Message};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Single-turn agent: optional system prompt plus the user's message
pub struct LlmAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the completion request for one message (pure function)
    fn build_request(&self, message: &str) -> CompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt.clone()));
        }
        messages.push(Message::user(message));

        CompletionRequest {
            messages,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl AgentGateway for LlmAgent {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn stream(&self, message: &str) -> Result<FragmentStream, GatewayError> {
        let response = self.provider.complete(self.build_request(message)).await?;

        if response.finish_reason == FinishReason::Length {
            warn!(model = %response.model, "Completion truncated at max_tokens");
        }

        let content = response.content.ok_or_else(|| {
            GatewayError::MalformedStream("completion carried no text content".to_string())
        })?;

        debug!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Agent produced completion"
        );

        Ok(stream::once(async move { Ok(content) }).boxed())
    }
}
