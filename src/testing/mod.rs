//! Testing utilities and mock implementations
//!
//! Mock LLM providers and agent gateways for exercising the chat service
//! without network access.

pub mod mocks;

pub use mocks::*;
