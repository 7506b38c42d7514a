use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::CatalogLoadError;

/// Upper bound on compiled program size for a single topic pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Rule table derived from the QCB FinTech guidance documents.
pub const STANDARD_RULES: [(&str, f64); 10] = [
    ("Licensing Strategy", 0.3),
    ("Corporate Structure", 0.2),
    ("QCB Engagement", 0.5),
    ("AML Policy Drafting", 0.4),
    ("Transaction Monitoring", 0.3),
    ("FATF Compliance", 0.3),
    ("Data Residency", 0.5),
    ("Compliance Officer", 0.4),
    ("Capital Requirement", 0.5),
    ("Source of Funds", 0.3),
];

/// Named compliance concern, identified by its exact name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(pub String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How topic names become case-insensitive search patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicMatchMode {
    /// Escaped name, matched anywhere in the text.
    #[default]
    Literal,
    /// Escaped name, matched only on word boundaries.
    WordBoundary,
    /// Name interpreted as raw regular-expression syntax.
    Pattern,
}

impl TopicMatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "literal" | "substring" => Some(Self::Literal),
            "word" | "word_boundary" | "word-boundary" => Some(Self::WordBoundary),
            "pattern" | "regex" => Some(Self::Pattern),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::WordBoundary => "word_boundary",
            Self::Pattern => "pattern",
        }
    }

    fn compile(self, name: &str) -> Result<Regex, regex::Error> {
        let source = match self {
            Self::Literal => regex::escape(name),
            Self::WordBoundary => format!(r"\b{}\b", regex::escape(name)),
            Self::Pattern => name.to_string(),
        };

        RegexBuilder::new(&source)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
    }
}

/// Weighted topic together with its compiled search pattern.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    topic: Topic,
    weight: f64,
    pattern: Regex,
}

impl RuleEntry {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_mentioned_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Immutable topic-to-weight table, kept in load order.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    entries: Vec<RuleEntry>,
    mode: TopicMatchMode,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    topic: String,
    weight: f64,
}

impl RuleCatalog {
    /// Build the bundled rule table.
    pub fn standard(mode: TopicMatchMode) -> Result<Self, CatalogLoadError> {
        Self::from_weights(STANDARD_RULES, mode)
    }

    /// Validate and compile an ordered sequence of `(topic, weight)` pairs.
    pub fn from_weights<I, S>(weights: I, mode: TopicMatchMode) -> Result<Self, CatalogLoadError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (position, (name, weight)) in weights.into_iter().enumerate() {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(CatalogLoadError::EmptyTopic { position });
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(CatalogLoadError::DuplicateTopic(name));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(CatalogLoadError::InvalidWeight {
                    topic: name,
                    weight,
                });
            }

            let pattern = mode
                .compile(&name)
                .map_err(|source| CatalogLoadError::InvalidPattern {
                    topic: name.clone(),
                    source,
                })?;

            entries.push(RuleEntry {
                topic: Topic(name),
                weight,
                pattern,
            });
        }

        Ok(Self { entries, mode })
    }

    /// Parse a `topic,weight` CSV table with a header row.
    pub fn from_csv_reader<R: Read>(reader: R, mode: TopicMatchMode) -> Result<Self, CatalogLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.deserialize::<RuleRow>() {
            let row = record?;
            rows.push((row.topic, row.weight));
        }

        Self::from_weights(rows, mode)
    }

    /// Parse a JSON object mapping topic names to weights, keeping file order.
    pub fn from_json_reader<R: Read>(reader: R, mode: TopicMatchMode) -> Result<Self, CatalogLoadError> {
        let table: serde_json::Map<String, serde_json::Value> = serde_json::from_reader(reader)?;

        let mut rows = Vec::with_capacity(table.len());
        for (topic, value) in table {
            match value.as_f64() {
                Some(weight) => rows.push((topic, weight)),
                None => {
                    return Err(CatalogLoadError::InvalidWeight {
                        topic,
                        weight: f64::NAN,
                    })
                }
            }
        }

        Self::from_weights(rows, mode)
    }

    /// Load a rule table from disk; `.json` files are read as JSON, anything else as CSV.
    pub fn from_path(path: impl AsRef<Path>, mode: TopicMatchMode) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let catalog = if is_json {
            Self::from_json_reader(file, mode)?
        } else {
            Self::from_csv_reader(file, mode)?
        };

        info!(
            path = %path.display(),
            topics = catalog.len(),
            mode = mode.label(),
            "rule catalog loaded"
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.entries.iter().map(RuleEntry::topic)
    }

    pub fn weight(&self, topic: &Topic) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| &entry.topic == topic)
            .map(RuleEntry::weight)
    }

    pub fn contains(&self, topic: &Topic) -> bool {
        self.weight(topic).is_some()
    }

    /// Sum of every weight; the score reached when all topics are present.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(RuleEntry::weight).sum()
    }

    pub fn mode(&self) -> TopicMatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
