//! Read-only reference data loaded once at startup: the weighted rule table and the
//! program/expert catalog.

mod reference;
mod rules;

pub use reference::{Expert, Program, ReferenceCatalog};
pub use rules::{RuleCatalog, RuleEntry, Topic, TopicMatchMode, STANDARD_RULES};

use std::path::PathBuf;

/// Failure while loading or validating a catalog. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("unable to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed rule table: {0}")]
    Csv(#[from] csv::Error),
    #[error("rule topic at position {position} is empty")]
    EmptyTopic { position: usize },
    #[error("rule topic '{0}' is listed more than once")]
    DuplicateTopic(String),
    #[error("rule topic '{topic}' has invalid weight {weight}")]
    InvalidWeight { topic: String, weight: f64 },
    #[error("rule topic '{topic}' does not compile to a search pattern: {source}")]
    InvalidPattern {
        topic: String,
        source: regex::Error,
    },
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
