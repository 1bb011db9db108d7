//! Error types for the chat service
//!
//! Every per-request failure is one of two kinds. Callers only ever see the
//! fixed public message for each kind; the underlying cause goes to the logs.

use crate::gateway::GatewayError;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Public body text for a missing or empty message
pub const NO_MESSAGE_PROVIDED: &str = "No message provided";

/// Public body text for any generative fallback failure
pub const AGENT_FAILURE: &str = "Failed to get response from AI";

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)([=:]\s*)\S+").expect("secret pattern is valid")
});

/// Main error type for chat requests
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Upstream agent error: {0}")]
    UpstreamAgent(#[from] GatewayError),
}

impl ChatError {
    /// Create invalid request error
    pub fn invalid_request<S: Into<String>>(reason: S) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::InvalidRequest { .. } => 400,
            ChatError::UpstreamAgent(_) => 500,
        }
    }

    /// Message safe to return to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            ChatError::InvalidRequest { .. } => NO_MESSAGE_PROVIDED,
            ChatError::UpstreamAgent(_) => AGENT_FAILURE,
        }
    }

    /// Full cause for operator logs, with credentials masked
    pub fn log_detail(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

/// Mask credential-looking values in error text before it is logged
pub fn sanitize_error_message(message: &str) -> String {
    SECRET_PATTERN
        .replace_all(message, "${1}${2}***")
        .into_owned()
}

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;
