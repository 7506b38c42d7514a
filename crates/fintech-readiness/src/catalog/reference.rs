use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rules::{RuleCatalog, Topic};
use super::{contains_ignore_case, CatalogLoadError};

/// Support program tagged with the compliance topics it addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "program_name")]
    pub name: String,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
}

impl Program {
    /// Exact, case-sensitive membership of the topic name in `focus_areas`.
    pub fn covers(&self, topic: &Topic) -> bool {
        self.focus_areas
            .iter()
            .any(|focus| focus.as_str() == topic.as_str())
    }
}

/// Compliance expert with a free-text specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expert {
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub contact: String,
}

impl Expert {
    pub fn specializes_in(&self, needle: &str) -> bool {
        !needle.is_empty() && contains_ignore_case(&self.specialization, needle)
    }
}

/// Programs and experts in catalog order. Missing sections deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    #[serde(rename = "qdb_programs", default)]
    programs: Vec<Program>,
    #[serde(rename = "compliance_experts", default)]
    experts: Vec<Expert>,
}

impl ReferenceCatalog {
    pub fn new(programs: Vec<Program>, experts: Vec<Expert>) -> Self {
        Self { programs, experts }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogLoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            programs = catalog.programs.len(),
            experts = catalog.experts.len(),
            "reference catalog loaded"
        );
        Ok(catalog)
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn experts(&self) -> &[Expert] {
        &self.experts
    }

    /// Focus areas naming topics the rule table does not know about.
    ///
    /// Such references are tolerated; the program simply never matches on that name.
    pub fn dangling_focus_areas(&self, rules: &RuleCatalog) -> Vec<String> {
        let mut dangling: Vec<String> = Vec::new();
        for focus in self.programs.iter().flat_map(|program| &program.focus_areas) {
            let known = rules.topics().any(|topic| topic.as_str() == focus.as_str());
            if !known && !dangling.contains(focus) {
                dangling.push(focus.clone());
            }
        }

        for focus in &dangling {
            debug!(focus = %focus, "program focus area has no matching rule topic");
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TopicMatchMode;

    const CATALOG: &str = r#"{
        "qdb_programs": [
            {
                "program_name": "FinTech Accelerator",
                "focus_areas": ["Licensing Strategy", "QCB Engagement"],
                "eligibility": "Early-stage fintech startups"
            },
            {
                "program_name": "Export Readiness",
                "focus_areas": ["Market Entry"]
            }
        ],
        "compliance_experts": [
            {
                "name": "Dr. Amal Haddad",
                "specialization": "AML Policy Drafting, Transaction Monitoring",
                "contact": "amal@example.qa"
            }
        ]
    }"#;

    #[test]
    fn parses_catalog_sections_in_order() {
        let catalog = ReferenceCatalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        assert_eq!(catalog.programs().len(), 2);
        assert_eq!(catalog.programs()[0].name, "FinTech Accelerator");
        assert_eq!(catalog.programs()[1].eligibility, None);
        assert_eq!(catalog.experts()[0].contact, "amal@example.qa");
    }

    #[test]
    fn missing_sections_are_empty() {
        let catalog = ReferenceCatalog::from_reader("{}".as_bytes()).expect("empty object parses");
        assert!(catalog.programs().is_empty());
        assert!(catalog.experts().is_empty());
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        let err = ReferenceCatalog::from_reader("{\"qdb_programs\": [".as_bytes())
            .expect_err("truncated json fails");
        assert!(matches!(err, CatalogLoadError::Json(_)));
    }

    #[test]
    fn program_coverage_is_exact() {
        let catalog = ReferenceCatalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        let program = &catalog.programs()[0];
        assert!(program.covers(&Topic::from("QCB Engagement")));
        assert!(!program.covers(&Topic::from("qcb engagement")));
    }

    #[test]
    fn expert_specialization_is_case_insensitive() {
        let catalog = ReferenceCatalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        let expert = &catalog.experts()[0];
        assert!(expert.specializes_in("transaction monitoring"));
        assert!(!expert.specializes_in(""));
        assert!(!expert.specializes_in("Data Residency"));
    }

    #[test]
    fn reports_dangling_focus_areas_once() {
        let catalog = ReferenceCatalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        let rules = RuleCatalog::standard(TopicMatchMode::Literal).expect("standard rules");
        assert_eq!(catalog.dangling_focus_areas(&rules), vec!["Market Entry".to_string()]);
    }
}
