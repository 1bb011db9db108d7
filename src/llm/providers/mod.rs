//! LLM provider implementations
//!
//! Concrete implementations of the LlmProvider trait. Every supported backend
//! speaks the OpenAI chat completions format.

pub mod openai;

pub use openai::*;
