use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::gaps::{GapDetector, GapFlag};
use super::recommendations::RecommendationMatcher;
use super::{keywords, scoring};
use crate::catalog::{CatalogLoadError, Expert, Program, ReferenceCatalog, RuleCatalog, Topic};
use crate::config::AnalysisConfig;

pub const DEFAULT_MAX_TEXT_CHARS: usize = 1_000_000;

/// Outcome of one pipeline run over a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_topics: Vec<Topic>,
    pub gap_flags: Vec<GapFlag>,
    pub readiness_score: f64,
    pub recommended_programs: Vec<Program>,
    pub recommended_experts: Vec<Expert>,
}

/// Startup failure while assembling the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineBuildError {
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
    #[error("capital figure rule does not compile: {0}")]
    GapRule(#[from] regex::Error),
}

/// Shared, read-only pipeline: both catalogs plus the gap rules and matcher.
///
/// Nothing here is mutated after construction, so one instance can serve any number
/// of concurrent requests behind an `Arc`.
#[derive(Debug)]
pub struct ReadinessPipeline {
    rules: Arc<RuleCatalog>,
    references: Arc<ReferenceCatalog>,
    gaps: GapDetector,
    matcher: RecommendationMatcher,
    max_text_chars: usize,
}

impl ReadinessPipeline {
    pub fn new(
        rules: Arc<RuleCatalog>,
        references: Arc<ReferenceCatalog>,
        gaps: GapDetector,
    ) -> Self {
        Self {
            rules,
            references,
            gaps,
            matcher: RecommendationMatcher::without_gap_routes(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    pub fn with_matcher(mut self, matcher: RecommendationMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    /// Load both catalogs and build the gap rules described by `config`.
    ///
    /// Gap flags only route specialists when `config.gap_routes` is set.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, PipelineBuildError> {
        let rules = match &config.rules_path {
            Some(path) => RuleCatalog::from_path(path, config.topic_match)?,
            None => {
                let rules = RuleCatalog::standard(config.topic_match)?;
                debug!(topics = rules.len(), "using standard rule table");
                rules
            }
        };
        let references = ReferenceCatalog::from_path(&config.catalog_path)?;
        let dangling = references.dangling_focus_areas(&rules);
        if !dangling.is_empty() {
            info!(
                count = dangling.len(),
                "program focus areas outside the rule table can never match"
            );
        }

        let gaps = GapDetector::from_settings(&config.gaps)?;
        let matcher = if config.gap_routes {
            RecommendationMatcher::with_gap_routes()
        } else {
            RecommendationMatcher::without_gap_routes()
        };

        Ok(Self::new(Arc::new(rules), Arc::new(references), gaps)
            .with_matcher(matcher)
            .with_max_text_chars(config.max_text_chars))
    }

    pub fn rules(&self) -> &RuleCatalog {
        &self.rules
    }

    pub fn references(&self) -> &ReferenceCatalog {
        &self.references
    }

    pub fn gap_detector(&self) -> &GapDetector {
        &self.gaps
    }

    pub fn max_text_chars(&self) -> usize {
        self.max_text_chars
    }

    /// Run the full pipeline over decoded document text.
    pub fn run(&self, text: &str) -> MatchResult {
        let text = bounded_text(text, self.max_text_chars);
        run_with(text, &self.rules, &self.references, &self.gaps, &self.matcher)
    }
}

/// Detect topics and gaps, then score and recommend. Total over any input.
pub fn run_with(
    text: &str,
    rules: &RuleCatalog,
    references: &ReferenceCatalog,
    gaps: &GapDetector,
    matcher: &RecommendationMatcher,
) -> MatchResult {
    let matched_topics = keywords::detect(text, rules);
    let gap_flags = gaps.detect_gaps(text);
    let readiness_score = scoring::score(&matched_topics, rules);
    let recommendations = matcher.recommend(&matched_topics, &gap_flags, references);

    debug!(
        topics = matched_topics.len(),
        gaps = gap_flags.len(),
        score = readiness_score,
        programs = recommendations.programs.len(),
        experts = recommendations.experts.len(),
        "readiness pipeline completed"
    );

    MatchResult {
        matched_topics,
        gap_flags,
        readiness_score,
        recommended_programs: recommendations.programs,
        recommended_experts: recommendations.experts,
    }
}

fn bounded_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => {
            warn!(max_chars, "document text truncated before scanning");
            &text[..offset]
        }
        None => text,
    }
}

#[cfg(test)]
pub(crate) fn bounded_text_for_tests(text: &str, max_chars: usize) -> &str {
    bounded_text(text, max_chars)
}
