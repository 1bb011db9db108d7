//! Mock implementations for testing
//!
//! Provides mock LlmProvider and AgentGateway implementations that record the
//! calls they receive, so tests can assert on when the fallback was used.

use crate::gateway::{AgentGateway, FragmentStream, GatewayError};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, TokenUsage,
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock LLM provider for testing
#[derive(Debug, Default)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub current_response: Arc<Mutex<usize>>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
    pub should_fail: bool,
    pub omit_content: bool,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// A provider whose completions carry no text
    pub fn without_content() -> Self {
        Self {
            omit_content: true,
            ..Default::default()
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    pub async fn get_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().await.push(request);

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let mut current = self.current_response.lock().await;
        let response_idx = *current % self.responses.len().max(1);
        *current += 1;

        let content = if self.omit_content {
            None
        } else if self.responses.is_empty() {
            Some("Mock response".to_string())
        } else {
            Some(self.responses[response_idx].clone())
        };

        Ok(CompletionResponse {
            content,
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        if self.should_fail {
            Err(LlmError::RequestFailed(
                "Mock health check failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// How a [`MockAgentGateway`] behaves when called
#[derive(Debug, Clone)]
pub enum MockAgentBehavior {
    /// Emit these fragments, then finish
    Fragments(Vec<String>),
    /// Fail before producing a stream
    FailOnStart(String),
    /// Emit these fragments, then fail
    FailAfter(Vec<String>, String),
    /// Never produce anything
    Hang,
}

/// Mock agent gateway for testing
#[derive(Debug)]
pub struct MockAgentGateway {
    pub behavior: MockAgentBehavior,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockAgentGateway {
    pub fn new(behavior: MockAgentBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_fragments<S: Into<String>>(fragments: Vec<S>) -> Self {
        Self::new(MockAgentBehavior::Fragments(
            fragments.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn with_failure() -> Self {
        Self::new(MockAgentBehavior::FailOnStart(
            "Mock agent failure: api_key=sk-secret".to_string(),
        ))
    }

    pub fn hanging() -> Self {
        Self::new(MockAgentBehavior::Hang)
    }

    pub async fn get_calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl AgentGateway for MockAgentGateway {
    fn name(&self) -> &str {
        "mock-agent"
    }

    async fn stream(&self, message: &str) -> Result<FragmentStream, GatewayError> {
        self.calls.lock().await.push(message.to_string());

        match &self.behavior {
            MockAgentBehavior::Fragments(fragments) => {
                let items: Vec<Result<String, GatewayError>> =
                    fragments.iter().cloned().map(Ok).collect();
                Ok(stream::iter(items).boxed())
            }
            MockAgentBehavior::FailOnStart(reason) => {
                Err(LlmError::RequestFailed(reason.clone()).into())
            }
            MockAgentBehavior::FailAfter(fragments, reason) => {
                let mut items: Vec<Result<String, GatewayError>> =
                    fragments.iter().cloned().map(Ok).collect();
                items.push(Err(GatewayError::MalformedStream(reason.clone())));
                Ok(stream::iter(items).boxed())
            }
            MockAgentBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(stream::empty().boxed())
            }
        }
    }
}
