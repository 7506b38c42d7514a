use crate::infra::{load_service, CatalogSummary};
use chrono::Utc;
use clap::Args;
use fintech_readiness::config::AppConfig;
use fintech_readiness::document::{DocumentError, DocumentFormat};
use fintech_readiness::error::AppError;
use fintech_readiness::telemetry;
use fintech_readiness::workflows::readiness::report::PREVIEW_CHARS;
use fintech_readiness::workflows::readiness::{DocumentAnalysis, ReadinessReportView};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Document to analyze (.txt, .md, .pdf or .docx)
    pub(crate) file: PathBuf,
    /// Declared format, overriding the file extension (txt, md, pdf, docx)
    #[arg(long)]
    pub(crate) format: Option<String>,
    /// Print the full analysis as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
    /// Reference catalog to load instead of APP_CATALOG_PATH
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Reference catalog to load instead of APP_CATALOG_PATH
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        file,
        format,
        json,
        catalog,
    } = args;

    let config = cli_config(catalog)?;

    let format = detect_format(&file, format.as_deref())?;
    let bytes = std::fs::read(&file)?;
    let service = load_service(&config.analysis)?;
    let analysis = service.analyze_document(&bytes, format)?;

    if json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Analysis unavailable as JSON: {err}"),
        }
    } else {
        render_analysis(&file, &analysis);
    }

    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = cli_config(args.catalog)?;

    let service = load_service(&config.analysis)?;
    let summary = CatalogSummary::from_pipeline(service.pipeline(), Utc::now());
    render_catalog(&summary);
    Ok(())
}

/// Load config for a one-shot command and start logging on stderr.
fn cli_config(catalog: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = catalog {
        config.analysis.catalog_path = path;
    }

    telemetry::init_stderr(&config.telemetry)?;
    Ok(config)
}

/// Explicit tag first, then the guessed MIME type, then the bare extension.
pub(crate) fn detect_format(file: &Path, tag: Option<&str>) -> Result<DocumentFormat, DocumentError> {
    if let Some(tag) = tag {
        return DocumentFormat::from_tag(tag)
            .ok_or_else(|| DocumentError::UnsupportedFormat(tag.to_string()));
    }

    mime_guess::from_path(file)
        .iter()
        .find_map(|guess| DocumentFormat::from_mime(&guess))
        .or_else(|| DocumentFormat::from_path(file))
        .ok_or_else(|| DocumentError::UnsupportedFormat(file.display().to_string()))
}

fn render_analysis(file: &Path, analysis: &DocumentAnalysis) {
    let report: &ReadinessReportView = &analysis.report;

    println!("FinTech readiness report");
    match analysis.format {
        Some(format) => println!(
            "Source: {} ({}, {} characters)",
            file.display(),
            format,
            analysis.characters
        ),
        None => println!("Source: {} ({} characters)", file.display(), analysis.characters),
    }

    println!("\nDocument preview (first {PREVIEW_CHARS} characters):");
    println!("{}", report.preview);

    println!("\nDetected compliance topics: {}", report.topics_line());

    if report.gap_flags.is_empty() {
        println!("Gap flags: none");
    } else {
        println!("Gap flags:");
        for flag in &report.gap_flags {
            println!("  - {flag}");
        }
    }

    println!("\nRecommended QDB programs:");
    if let Some(guidance) = report.guidance {
        println!("  {guidance}");
    }
    for program in &report.programs {
        match &program.eligibility {
            Some(eligibility) => println!(
                "  - {} | Focus: {} | Eligibility: {}",
                program.name, program.focus, eligibility
            ),
            None => println!("  - {} | Focus: {}", program.name, program.focus),
        }
    }

    if !report.experts.is_empty() {
        println!("\nRecommended compliance experts:");
        for expert in &report.experts {
            println!(
                "  - {} | Specialization: {} | Contact: {}",
                expert.name, expert.specialization, expert.contact
            );
        }
    }

    println!("\nRegulatory readiness score: {}", report.readiness_label);
}

fn render_catalog(summary: &CatalogSummary) {
    println!(
        "Rule table ({} topics, {} matching, total weight {:.2})",
        summary.topics.len(),
        summary.match_mode,
        summary.total_weight
    );
    for entry in &summary.topics {
        println!("  - {}: {:.2}", entry.topic, entry.weight);
    }
    println!(
        "Reference catalog: {} programs | {} experts",
        summary.programs, summary.experts
    );
    println!("Gap rules: {}", summary.gap_rules);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_tag_overrides_extension() {
        let format = detect_format(Path::new("plan.txt"), Some("pdf")).expect("tag resolves");
        assert_eq!(format, DocumentFormat::Pdf);
    }

    #[test]
    fn guesses_format_from_extension() {
        assert_eq!(
            detect_format(Path::new("deck/business-plan.PDF"), None).expect("pdf guessed"),
            DocumentFormat::Pdf
        );
        assert_eq!(
            detect_format(Path::new("notes.md"), None).expect("markdown guessed"),
            DocumentFormat::Markdown
        );
        assert_eq!(
            detect_format(Path::new("plan.docx"), None).expect("docx guessed"),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn unknown_inputs_are_unsupported() {
        assert!(matches!(
            detect_format(Path::new("model.xlsx"), None),
            Err(DocumentError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_format(Path::new("plan.txt"), Some("rtf")),
            Err(DocumentError::UnsupportedFormat(tag)) if tag == "rtf"
        ));
    }

    #[test]
    fn one_shot_commands_start_telemetry() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        std::env::set_var("APP_LOG_LEVEL", "fintech_readiness=loud");
        let outcome = cli_config(Some(PathBuf::from("catalog.json")));
        std::env::remove_var("APP_LOG_LEVEL");

        assert!(matches!(outcome, Err(AppError::Telemetry(_))));
    }
}
