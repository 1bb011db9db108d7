//! Intent router: the deterministic fast path
//!
//! Precedence is fixed: the link directory is consulted first, then every rule
//! in catalog order. Nothing here allocates shared state or can fail, so one
//! router is shared by all concurrent requests.

use super::catalog::RuleCatalog;
use super::links::LinkDirectory;

/// What produced a routed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    /// A link directory keyword matched
    Link { keyword: String, path: String },
    /// A catalog rule matched
    Rule { name: &'static str },
}

impl RouteSource {
    /// Short label used in log fields
    pub fn label(&self) -> &str {
        match self {
            RouteSource::Link { keyword, .. } => keyword,
            RouteSource::Rule { name } => name,
        }
    }
}

/// A deterministic answer and its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedReply {
    pub source: RouteSource,
    pub text: String,
}

/// Maps a raw message to a canned answer, or to nothing
#[derive(Debug, Clone)]
pub struct IntentRouter {
    base_url: String,
    links: LinkDirectory,
    rules: RuleCatalog,
}

impl IntentRouter {
    pub fn new(base_url: impl Into<String>, links: LinkDirectory, rules: RuleCatalog) -> Self {
        Self {
            base_url: base_url.into(),
            links,
            rules,
        }
    }

    /// Router over the built-in directory and catalog
    pub fn standard(base_url: impl Into<String>) -> Self {
        Self::new(base_url, LinkDirectory::standard(), RuleCatalog::standard())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer text for `message`, or `None` when the generative fallback is needed
    pub fn route(&self, message: &str) -> Option<String> {
        self.resolve(message).map(|reply| reply.text)
    }

    /// Like [`route`](Self::route), also reporting which entry answered
    pub fn resolve(&self, message: &str) -> Option<RoutedReply> {
        let lowered = message.to_lowercase();

        if let Some(entry) = self.links.lookup_entry(&lowered) {
            return Some(RoutedReply {
                text: format!("{}{}", self.base_url, entry.path),
                source: RouteSource::Link {
                    keyword: entry.keyword.clone(),
                    path: entry.path.clone(),
                },
            });
        }

        self.rules.first_match(&lowered).map(|rule| RoutedReply {
            source: RouteSource::Rule { name: rule.name },
            text: rule.respond(&self.base_url),
        })
    }
}
