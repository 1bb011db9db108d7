//! Chat request handling
//!
//! The dispatcher owns the request lifecycle: validation, the deterministic
//! fast path and the generative fallback.

pub mod dispatcher;

pub use dispatcher::{ChatDispatcher, ChatReply, ChatRequest, ReplyOrigin};
