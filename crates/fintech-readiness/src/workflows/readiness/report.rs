use serde::Serialize;

use super::pipeline::MatchResult;

pub const PREVIEW_CHARS: usize = 500;
pub const NO_PROGRAM_GUIDANCE: &str =
    "No direct match found. Try rephrasing your startup document focus areas.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramView {
    pub name: String,
    pub focus: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpertView {
    pub name: String,
    pub specialization: String,
    pub contact: String,
}

/// Presentation-ready rendering of a [`MatchResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessReportView {
    pub preview: String,
    pub detected_topics: Vec<String>,
    pub gap_flags: Vec<String>,
    pub programs: Vec<ProgramView>,
    pub experts: Vec<ExpertView>,
    pub readiness_score: f64,
    pub readiness_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<&'static str>,
}

impl ReadinessReportView {
    pub fn build(text: &str, result: &MatchResult) -> Self {
        let programs = result
            .recommended_programs
            .iter()
            .map(|program| ProgramView {
                name: program.name.clone(),
                focus: program.focus_areas.join(", "),
                eligibility: program.eligibility.clone(),
            })
            .collect::<Vec<_>>();

        let experts = result
            .recommended_experts
            .iter()
            .map(|expert| ExpertView {
                name: expert.name.clone(),
                specialization: expert.specialization.clone(),
                contact: expert.contact.clone(),
            })
            .collect();

        let guidance = programs.is_empty().then_some(NO_PROGRAM_GUIDANCE);

        Self {
            preview: document_preview(text, PREVIEW_CHARS).to_string(),
            detected_topics: result
                .matched_topics
                .iter()
                .map(|topic| topic.to_string())
                .collect(),
            gap_flags: result.gap_flags.iter().map(|flag| flag.to_string()).collect(),
            programs,
            experts,
            readiness_score: result.readiness_score,
            readiness_label: score_label(result.readiness_score),
            guidance,
        }
    }

    /// Comma-separated topic list, or `None` when nothing matched.
    pub fn topics_line(&self) -> String {
        if self.detected_topics.is_empty() {
            "None".to_string()
        } else {
            self.detected_topics.join(", ")
        }
    }
}

/// Leading `limit` characters of the document, cut on a char boundary.
pub fn document_preview(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Score with the fixed `/100` suffix, e.g. `40.0/100` or `33.33/100`.
pub fn score_label(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}/100")
    } else {
        format!("{score}/100")
    }
}
