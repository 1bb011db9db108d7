//! Deterministic intent routing
//!
//! - [`links`]: keyword -> storefront path directory
//! - [`catalog`]: ordered predicate/responder rules
//! - [`router`]: the fixed-precedence scan over both

pub mod catalog;
pub mod links;
pub mod router;

pub use catalog::{Rule, RuleCatalog, PRICE_WORDS, ROUTE_LISTING};
pub use links::{CatalogError, KeywordEntry, LinkDirectory};
pub use router::{IntentRouter, RouteSource, RoutedReply};
