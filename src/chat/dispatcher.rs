//! Chat dispatcher: validate, route, fall back
//!
//! ```text
//! Received -> Validated -> RuleMatched -> Responding
//!                       -> RuleMiss -> AgentPending -> AgentSucceeded -> Responding
//!                                                   -> AgentFailed    -> Failing
//! ```
//!
//! The agent gateway is only touched on a rule miss, exactly once, without
//! retries.

use crate::{agent_span, chat_span};
use crate::error::{ChatError, ChatResult};
use crate::gateway::{AgentGateway, GatewayError};
use crate::intent::{IntentRouter, RouteSource};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

/// Inbound chat request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The message, if present and non-empty
    fn validated_message(&self) -> ChatResult<&str> {
        match self.message.as_deref() {
            None => Err(ChatError::invalid_request("message is missing")),
            Some("") => Err(ChatError::invalid_request("message is empty")),
            Some(message) => Ok(message),
        }
    }
}

/// Where a successful reply came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOrigin {
    Rule(RouteSource),
    Agent,
}

/// Successful chat outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub origin: ReplyOrigin,
}

/// Dispatcher configuration and collaborators, injected at construction
pub struct ChatDispatcher {
    router: Arc<IntentRouter>,
    agent: Arc<dyn AgentGateway>,
    agent_timeout: Option<Duration>,
}

impl ChatDispatcher {
    pub fn new(router: Arc<IntentRouter>, agent: Arc<dyn AgentGateway>) -> Self {
        Self {
            router,
            agent,
            agent_timeout: None,
        }
    }

    /// Bound the whole fallback call, stream consumption included
    pub fn with_agent_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// Handle one chat request
    pub async fn handle(&self, request: ChatRequest) -> ChatResult<ChatReply> {
        let request_id = Uuid::new_v4();
        let span = chat_span!(request_id = %request_id);
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: ChatRequest) -> ChatResult<ChatReply> {
        let message = match request.validated_message() {
            Ok(message) => message,
            Err(e) => {
                info!(outcome = "invalid_request", "Rejected chat request: {}", e);
                return Err(e);
            }
        };
        debug!(state = "validated", chars = message.chars().count());

        if let Some(reply) = self.router.resolve(message) {
            info!(
                outcome = "rule_matched",
                matched = reply.source.label(),
                "Answered from rule catalog"
            );
            return Ok(ChatReply {
                response: reply.text,
                origin: ReplyOrigin::Rule(reply.source),
            });
        }

        debug!(state = "agent_pending", agent = self.agent.name());
        match self.ask_agent(message).await {
            Ok(response) => {
                info!(
                    outcome = "agent_succeeded",
                    agent = self.agent.name(),
                    "Answered by generative agent"
                );
                Ok(ChatReply {
                    response,
                    origin: ReplyOrigin::Agent,
                })
            }
            Err(e) => {
                let err = ChatError::from(e);
                error!(
                    outcome = "agent_failed",
                    agent = self.agent.name(),
                    "Agent gateway failed: {}",
                    err.log_detail()
                );
                Err(err)
            }
        }
    }

    async fn ask_agent(&self, message: &str) -> Result<String, GatewayError> {
        let call = async {
            let fragments = self.agent.stream(message).await?;
            collect_fragments(fragments).await
        }
        .instrument(agent_span!(agent = self.agent.name()));

        match self.agent_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout(limit))?,
            None => call.await,
        }
    }
}

/// Join fragments in emission order with no separator
async fn collect_fragments(
    fragments: crate::gateway::FragmentStream,
) -> Result<String, GatewayError> {
    fragments
        .try_fold(String::new(), |mut acc, fragment| async move {
            acc.push_str(&fragment);
            Ok(acc)
        })
        .await
}
