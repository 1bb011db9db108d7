//! LLM provider abstraction layer
//!
//! A provider-agnostic completion interface plus the OpenAI-compatible client
//! used for the Groq and OpenAI backends.

pub mod provider;
pub mod providers;

pub use provider::*;
pub use providers::*;
