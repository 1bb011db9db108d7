//! PaperSprint chat service
//!
//! A hybrid chat back-end for the PaperSprint printing and delivery storefront.
//! Deterministic rules answer the common questions (pricing, login, cart,
//! order tracking, page links); anything else is handed to a generative agent.
//!
//! # Overview
//!
//! - [`intent`]: link directory, rule catalog and the fixed-precedence router
//! - [`chat`]: the dispatcher that validates, routes and falls back
//! - [`gateway`]: the generative fallback contract and its LLM-backed agent
//! - [`llm`]: provider abstraction and the OpenAI-compatible client
//! - [`server`]: warp HTTP surface
//!
//! # Quick Start
//!
//! ```rust
//! use papersprint_chat::intent::IntentRouter;
//!
//! let router = IntentRouter::standard("https://papersprint.example");
//!
//! assert_eq!(
//!     router.route("where is the blog").as_deref(),
//!     Some("https://papersprint.example/blog")
//! );
//! assert!(router.route("tell me a joke").is_none());
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod llm;
pub mod observability;
pub mod server;
pub mod testing;

pub use chat::{ChatDispatcher, ChatReply, ChatRequest, ReplyOrigin};
pub use config::{ChatConfig, ConfigError};
pub use error::{ChatError, ChatResult};
pub use gateway::{AgentGateway, FragmentStream, GatewayError, LlmAgent};
pub use intent::{IntentRouter, LinkDirectory, RuleCatalog};
pub use server::ChatServer;
