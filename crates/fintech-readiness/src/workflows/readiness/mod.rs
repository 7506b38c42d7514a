//! Readiness workflow: topic detection, gap heuristics, scoring and recommendation
//! matching over a single document's text.

pub mod gaps;
pub mod keywords;
mod pipeline;
mod recommendations;
pub mod report;
pub mod router;
pub mod scoring;
mod service;

#[cfg(test)]
mod tests;

pub use gaps::{
    CapitalFigureRule, CapitalPolicy, GapDetector, GapFlag, GapRule, GapSettings,
    RequiredPhraseRule, ResidencyIndicatorRule,
};
pub use pipeline::{
    run_with, MatchResult, PipelineBuildError, ReadinessPipeline, DEFAULT_MAX_TEXT_CHARS,
};
pub use recommendations::{GapRoute, RecommendationMatcher, Recommendations};
pub use report::ReadinessReportView;
pub use router::readiness_router;
pub use service::{DocumentAnalysis, ReadinessService};
