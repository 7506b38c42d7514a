use std::sync::Arc;

use crate::catalog::{Expert, Program, ReferenceCatalog, RuleCatalog, TopicMatchMode};
use crate::document::StandardExtractor;
use crate::workflows::readiness::{GapDetector, ReadinessPipeline, ReadinessService};

pub(super) const REFERENCE_JSON: &str = r#"{
    "qdb_programs": [
        {
            "program_name": "QDB FinTech Accelerator",
            "focus_areas": ["Licensing Strategy", "QCB Engagement"],
            "eligibility": "Early-stage startups registered in Qatar"
        },
        {
            "program_name": "AML Readiness Clinic",
            "focus_areas": ["AML Policy Drafting", "Transaction Monitoring"],
            "eligibility": "Licensed payment service providers"
        },
        {
            "program_name": "Hospitality Grant",
            "focus_areas": ["Tourism Marketing"]
        }
    ],
    "compliance_experts": [
        {
            "name": "Dr. Amal Haddad",
            "specialization": "AML policy drafting and FATF compliance",
            "contact": "amal.haddad@example.qa"
        },
        {
            "name": "Yousef Al-Kuwari",
            "specialization": "Data residency and cloud protection",
            "contact": "yousef@example.qa"
        },
        {
            "name": "Mariam Saleh",
            "specialization": "Compliance officer appointments",
            "contact": "mariam@example.qa"
        },
        {
            "name": "Omar Nasser",
            "specialization": "Capital adequacy reviews",
            "contact": "omar@example.qa"
        }
    ]
}"#;

pub(super) fn references() -> ReferenceCatalog {
    ReferenceCatalog::from_reader(REFERENCE_JSON.as_bytes()).expect("reference fixture parses")
}

pub(super) fn rules() -> RuleCatalog {
    RuleCatalog::standard(TopicMatchMode::Literal).expect("standard rules compile")
}

pub(super) fn rules_with(weights: &[(&str, f64)]) -> RuleCatalog {
    RuleCatalog::from_weights(weights.iter().copied(), TopicMatchMode::Literal)
        .expect("fixture rules compile")
}

pub(super) fn pipeline() -> ReadinessPipeline {
    ReadinessPipeline::new(
        Arc::new(rules()),
        Arc::new(references()),
        GapDetector::standard().expect("standard gap rules compile"),
    )
}

pub(super) fn service() -> Arc<ReadinessService<StandardExtractor>> {
    Arc::new(ReadinessService::new(
        Arc::new(pipeline()),
        Arc::new(StandardExtractor::default()),
    ))
}

pub(super) fn program(name: &str, focus: &[&str]) -> Program {
    Program {
        name: name.to_string(),
        focus_areas: focus.iter().map(|area| area.to_string()).collect(),
        eligibility: None,
    }
}

pub(super) fn expert(name: &str, specialization: &str) -> Expert {
    Expert {
        name: name.to_string(),
        specialization: specialization.to_string(),
        contact: format!("{}@example.qa", name.to_lowercase().replace(' ', ".")),
    }
}

/// Text that mentions a compliance officer and no residency indicator or capital figure.
pub(super) const QUIET_TEXT: &str =
    "Our appointed compliance officer reviews onboarding each quarter.";
