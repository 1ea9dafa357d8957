pub mod assess;
pub mod extract;
pub mod interactive;
pub mod matching;
pub mod samples;

use anyhow::{ anyhow, Context, Result };
use std::fs;
use std::path::Path;
use std::sync::Arc;

use patentfinder::models::common::ExecutionMode;
use patentfinder::models::report::AssessmentRequest;
use patentfinder::samples::{ SampleMolecule, SAMPLE_PATENT_CLAIM };
use patentfinder::{ AgentContext, ClientConfig, InfringementPipeline, LlmClient, RetryingModelClient };

use crate::cli::InputArgs;

/// Output format selected with `--output-format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unsupported output format: {}", value)),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    ClientConfig::load(path).context("Failed to load configuration")
}

/// Model client with retries and deadlines, shared by all agents
pub fn build_pipeline(config: &ClientConfig, mode: ExecutionMode) -> Result<InfringementPipeline> {
    let client = LlmClient::new(config.clone())?;
    let client = RetryingModelClient::new(client, config.retry.clone(), config.request_timeout());
    let context = AgentContext::from_config(Arc::new(client), config);
    Ok(InfringementPipeline::new(context, mode))
}

pub fn read_patent(path: Option<&Path>, inline: Option<&str>) -> Result<String> {
    match (path, inline) {
        (Some(path), _) =>
            fs
                ::read_to_string(path)
                .with_context(|| format!("Failed to read patent file {}", path.display())),
        (None, Some(text)) => Ok(text.to_string()),
        (None, None) => Ok(SAMPLE_PATENT_CLAIM.to_string()),
    }
}

pub fn resolve_request(input: &InputArgs) -> Result<AssessmentRequest> {
    let molecule = match (&input.molecule, input.sample) {
        (Some(molecule), _) => molecule.clone(),
        (None, Some(sample)) => SampleMolecule::from(sample).smiles().to_string(),
        (None, None) => String::new(),
    };
    let patent_text = read_patent(input.patent.as_deref(), input.patent_text.as_deref())?;
    Ok(AssessmentRequest::new(molecule, patent_text))
}
