use serde::Serialize;

use super::gaps::GapFlag;
use crate::catalog::{Expert, Program, ReferenceCatalog, Topic};

/// Routes a raised gap flag to experts whose specialization mentions `keyword`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapRoute {
    pub flag: GapFlag,
    pub keyword: String,
}

impl GapRoute {
    pub fn new(flag: GapFlag, keyword: impl Into<String>) -> Self {
        Self {
            flag,
            keyword: keyword.into(),
        }
    }
}

/// Programs and experts selected for one document, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub programs: Vec<Program>,
    pub experts: Vec<Expert>,
}

/// Joins detected topics and gap flags against the reference catalog.
#[derive(Debug, Clone)]
pub struct RecommendationMatcher {
    routes: Vec<GapRoute>,
}

impl Default for RecommendationMatcher {
    fn default() -> Self {
        Self::without_gap_routes()
    }
}

impl RecommendationMatcher {
    pub fn new(routes: Vec<GapRoute>) -> Self {
        Self { routes }
    }

    /// Topic matching only; gap flags never add experts.
    pub fn without_gap_routes() -> Self {
        Self::new(Vec::new())
    }

    /// Also sends each bundled gap flag to experts whose specialization names the
    /// missing function.
    pub fn with_gap_routes() -> Self {
        Self::new(vec![
            GapRoute::new(GapFlag::MISSING_COMPLIANCE_OFFICER, "Compliance Officer"),
            GapRoute::new(GapFlag::DATA_RESIDENCY, "Data Residency"),
            GapRoute::new(GapFlag::CAPITAL_DEFICIENCY, "Capital"),
        ])
    }

    pub fn routes(&self) -> &[GapRoute] {
        &self.routes
    }

    /// A program qualifies when any focus area is a matched topic. An expert qualifies
    /// when a matched topic, or the keyword of a routed gap flag, appears in the
    /// specialization text regardless of case.
    pub fn recommend(
        &self,
        matched: &[Topic],
        gaps: &[GapFlag],
        catalog: &ReferenceCatalog,
    ) -> Recommendations {
        let programs = catalog
            .programs()
            .iter()
            .filter(|program| matched.iter().any(|topic| program.covers(topic)))
            .cloned()
            .collect();

        let routed: Vec<&str> = self
            .routes
            .iter()
            .filter(|route| gaps.contains(&route.flag))
            .map(|route| route.keyword.as_str())
            .collect();

        let experts = catalog
            .experts()
            .iter()
            .filter(|expert| {
                matched
                    .iter()
                    .any(|topic| expert.specializes_in(topic.as_str()))
                    || routed.iter().any(|keyword| expert.specializes_in(keyword))
            })
            .cloned()
            .collect();

        Recommendations { programs, experts }
    }
}
