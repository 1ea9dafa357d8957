use anyhow::Result;
use log::{ error, info };
use std::fs;
use std::path::Path;

use patentfinder::models::common::ExecutionMode;
use patentfinder::models::report::AssessmentRequest;
use patentfinder::samples::SampleMolecule;
use patentfinder::{ ClientConfig, ErrorSeverity, NoopObserver, PatentError, RecoverableError };

use crate::cli::commands::{ build_pipeline, OutputFormat };
use crate::cli::ui;

/// Full pipeline command
pub async fn execute(
    config: &ClientConfig,
    request: AssessmentRequest,
    stream: bool,
    output_path: Option<&Path>,
    format: OutputFormat
) -> Result<()> {
    if let Err(e) = request.validate() {
        ui::print_error(&e.to_string());
        return Err(e.into());
    }

    let mode = if stream { ExecutionMode::Streaming } else { ExecutionMode::Blocking };
    let pipeline = build_pipeline(config, mode)?;

    if format == OutputFormat::Text {
        ui::print_header("Patent Infringement Assessment");
        ui::print_result("Query molecule", &request.query_molecule);
        if let Some(sample) = SampleMolecule::identify(&request.query_molecule) {
            ui::print_result("Sample", sample.label());
        }
        ui::print_result("Model", &config.llm_api.model);
    }

    let result = match format {
        OutputFormat::Text => {
            let mut observer = ui::ConsoleObserver::new(stream);
            pipeline.run(&request, &mut observer).await
        }
        OutputFormat::Json => pipeline.run(&request, &mut NoopObserver).await,
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Text => {
            ui::print_header("Result");
            ui::print_verdict(report.verdict());
            if let Some(sample) = SampleMolecule::identify(&request.query_molecule) {
                if sample.expected_verdict() != report.verdict() {
                    ui::print_warning(
                        &format!("Case study expects {}; the examiner disagreed", sample.expected_verdict())
                    );
                }
            }
            ui::print_success("Patent infringement assessment complete");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(output_path) = output_path {
        fs::write(output_path, report.to_markdown())?;
        info!("Report saved to {}", output_path.display());
        if format == OutputFormat::Text {
            ui::print_success(&format!("Report saved to {}", output_path.display()));
        }
    }

    Ok(())
}

fn report_failure(err: &PatentError) {
    error!("Assessment failed: {}", err);
    let summary = match err.failed_step() {
        Some(step) => format!("Step {} ({}) failed", step.number(), step),
        None => "Assessment failed".to_string(),
    };
    match err.severity() {
        ErrorSeverity::Fatal => ui::print_error(&format!("{} and cannot be retried: {}", summary, err)),
        ErrorSeverity::Error => ui::print_error(&format!("{}: {}", summary, err)),
        ErrorSeverity::Warning => ui::print_warning(&err.to_string()),
    }
    if let Some(hint) = err.recovery_strategy() {
        ui::print_info(&hint);
    }
}
