use std::time::Duration;
use thiserror::Error;

use crate::models::common::PipelineStep;

/// Custom error types for the PatentFinder pipeline
#[derive(Debug, Error)]
pub enum PatentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Markush extraction error: {0}")]
    ExtractionError(String),

    #[error("Substituent matching error: {0}")]
    MatchingError(String),

    #[error("Model API error: {0}")]
    ModelError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Failed to parse model response: {0}")]
    ParseError(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Step {} ({step}) failed: {source}", .step.number())]
    StepFailed {
        step: PipelineStep,
        source: Box<PatentError>,
    },

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
}

/// Result type specific to PatentFinder operations
pub type PatentResult<T> = Result<T, PatentError>;

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Fatal,
    Error,
    Warning,
}

/// Recoverable vs. non-recoverable errors
pub trait RecoverableError {
    fn is_recoverable(&self) -> bool;
    fn recovery_strategy(&self) -> Option<String>;
}

impl PatentError {
    /// Attribute this error to a pipeline step. Already-attributed errors are kept as is.
    pub fn in_step(self, step: PipelineStep) -> PatentError {
        match self {
            err @ PatentError::StepFailed { .. } => err,
            err => PatentError::StepFailed { step, source: Box::new(err) },
        }
    }

    /// The step a failure was attributed to, if any
    pub fn failed_step(&self) -> Option<PipelineStep> {
        match self {
            PatentError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PatentError::InvalidInput(_) => ErrorSeverity::Warning,
            PatentError::ConfigError(_) | PatentError::TemplateError(_) => ErrorSeverity::Fatal,
            PatentError::HttpError { status, .. } if *status == 401 || *status == 403 => {
                ErrorSeverity::Fatal
            }
            PatentError::StepFailed { source, .. } => source.severity(),
            _ => ErrorSeverity::Error,
        }
    }
}

impl RecoverableError for PatentError {
    fn is_recoverable(&self) -> bool {
        match self {
            PatentError::NetworkError(_) | PatentError::Timeout(_) => true,
            PatentError::HttpError { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            PatentError::StepFailed { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    fn recovery_strategy(&self) -> Option<String> {
        match self {
            PatentError::InvalidInput(_) =>
                Some("Provide both a query molecule and patent claim text".to_string()),
            PatentError::HttpError { status: 401, .. } | PatentError::HttpError { status: 403, .. } =>
                Some(
                    "Check ANTHROPIC_API_KEY / OPENAI_API_KEY or the api_key in the config file".to_string()
                ),
            PatentError::HttpError { status: 429, .. } =>
                Some("Rate limited; wait and rerun, or raise retry.max_attempts".to_string()),
            PatentError::Timeout(_) =>
                Some("Increase request_timeout_secs in the config file".to_string()),
            PatentError::NetworkError(_) => Some("Check network connectivity".to_string()),
            PatentError::StepFailed { source, .. } => source.recovery_strategy(),
            _ => None,
        }
    }
}
