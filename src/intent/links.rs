//! Keyword to storefront path directory
//!
//! The directory is the first thing the intent router consults. Entries are
//! scanned in declaration order and the first keyword contained in the
//! lowercased message wins, so multi-word keywords must be declared before the
//! single-word keywords they contain.

use std::collections::HashSet;
use thiserror::Error;

/// A single keyword -> path mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub keyword: String,
    pub path: String,
}

impl KeywordEntry {
    pub fn new(keyword: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            path: path.into(),
        }
    }
}

/// Errors raised while building a catalog from caller-supplied entries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Keyword '{0}' must be lowercase")]
    NotLowercase(String),
    #[error("Duplicate keyword: {0}")]
    DuplicateKeyword(String),
    #[error("Path for keyword '{keyword}' must start with '/': {path}")]
    RelativePath { keyword: String, path: String },
}

/// Storefront paths, in lookup order.
const STANDARD_LINKS: &[(&str, &str)] = &[
    ("partner dashboard", "/partner/dashboard"),
    ("register partner", "/registerPartner"),
    ("partner", "/partner-with-us"),
    ("courier", "/courier-dashboard"),
    ("admin", "/admin-panel"),
    ("order dashboard", "/order-dashboard"),
    ("print section", "/print-section"),
    ("upload", "/print-section"),
    ("privacy", "/privacy-policy"),
    ("terms", "/terms-of-service"),
    ("contact", "/contact-us"),
    ("about us", "/about-us"),
    ("career", "/careers"),
    ("blog", "/blog"),
    ("profile", "/profile"),
    ("payment", "/payment"),
];

/// Immutable keyword directory
#[derive(Debug, Clone)]
pub struct LinkDirectory {
    entries: Vec<KeywordEntry>,
}

impl LinkDirectory {
    /// Build a directory from entries, keeping their order as the tie-break.
    pub fn new(entries: Vec<KeywordEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.keyword.trim().is_empty() {
                return Err(CatalogError::EmptyKeyword);
            }
            if entry.keyword != entry.keyword.to_lowercase() {
                return Err(CatalogError::NotLowercase(entry.keyword.clone()));
            }
            if !entry.path.starts_with('/') {
                return Err(CatalogError::RelativePath {
                    keyword: entry.keyword.clone(),
                    path: entry.path.clone(),
                });
            }
            if !seen.insert(entry.keyword.as_str()) {
                return Err(CatalogError::DuplicateKeyword(entry.keyword.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// The storefront's built-in directory
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_LINKS
                .iter()
                .map(|(keyword, path)| KeywordEntry::new(*keyword, *path))
                .collect(),
        }
    }

    /// Path of the first entry whose keyword occurs in `message`
    pub fn lookup(&self, message: &str) -> Option<&str> {
        self.lookup_entry(&message.to_lowercase())
            .map(|entry| entry.path.as_str())
    }

    /// Same as [`lookup`](Self::lookup) but over an already lowercased message,
    /// returning the whole entry.
    pub(crate) fn lookup_entry(&self, lowered: &str) -> Option<&KeywordEntry> {
        self.entries
            .iter()
            .find(|entry| lowered.contains(entry.keyword.as_str()))
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LinkDirectory {
    fn default() -> Self {
        Self::standard()
    }
}
