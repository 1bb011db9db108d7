//! Generative fallback gateway
//!
//! The dispatcher only calls the gateway when no deterministic rule answered.
//! A gateway turns one user message into a finite, non-restartable stream of
//! text fragments; the dispatcher joins them in emission order.

pub mod llm_agent;

use crate::llm::LlmError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::time::Duration;
use thiserror::Error;

pub use llm_agent::LlmAgent;

/// Text fragments produced by a gateway, in emission order
pub type FragmentStream = BoxStream<'static, Result<String, GatewayError>>;

/// Failures of the generative fallback
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("LLM provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Agent did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Malformed agent stream: {0}")]
    MalformedStream(String),
}

/// External generative agent contract
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Name used in logs (usually the backing provider)
    fn name(&self) -> &str;

    /// Start answering `message`
    async fn stream(&self, message: &str) -> Result<FragmentStream, GatewayError>;
}
