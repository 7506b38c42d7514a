use chrono::{DateTime, Utc};
use fintech_readiness::config::AnalysisConfig;
use fintech_readiness::document::StandardExtractor;
use fintech_readiness::error::AppError;
use fintech_readiness::workflows::readiness::{ReadinessPipeline, ReadinessService};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type SharedService = Arc<ReadinessService<StandardExtractor>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<CatalogSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TopicWeight {
    pub(crate) topic: String,
    pub(crate) weight: f64,
}

/// Snapshot of the catalogs loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CatalogSummary {
    pub(crate) match_mode: &'static str,
    pub(crate) topics: Vec<TopicWeight>,
    pub(crate) total_weight: f64,
    pub(crate) programs: usize,
    pub(crate) experts: usize,
    pub(crate) gap_rules: usize,
    pub(crate) loaded_at: DateTime<Utc>,
}

impl CatalogSummary {
    pub(crate) fn from_pipeline(pipeline: &ReadinessPipeline, loaded_at: DateTime<Utc>) -> Self {
        let rules = pipeline.rules();
        let topics = rules
            .entries()
            .iter()
            .map(|entry| TopicWeight {
                topic: entry.topic().to_string(),
                weight: entry.weight(),
            })
            .collect();

        Self {
            match_mode: rules.mode().label(),
            topics,
            total_weight: rules.total_weight(),
            programs: pipeline.references().programs().len(),
            experts: pipeline.references().experts().len(),
            gap_rules: pipeline.gap_detector().len(),
            loaded_at,
        }
    }
}

/// Load both catalogs once and wrap them in the shared service.
pub(crate) fn load_service(config: &AnalysisConfig) -> Result<SharedService, AppError> {
    let pipeline = ReadinessPipeline::from_config(config)?;
    info!(
        topics = pipeline.rules().len(),
        programs = pipeline.references().programs().len(),
        experts = pipeline.references().experts().len(),
        mode = pipeline.rules().mode().label(),
        "readiness catalogs loaded"
    );

    let extractor = StandardExtractor::new(config.max_document_bytes);
    let service = ReadinessService::new(Arc::new(pipeline), Arc::new(extractor))
        .with_upload_limit(config.max_document_bytes);
    Ok(Arc::new(service))
}
