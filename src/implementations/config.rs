use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ PromptBudgets, RetryPolicy };
use crate::errors::PatentError;
use crate::models::common::AgentRole;

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required API key: {0}")]
    MissingApiKey(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for PatentError {
    fn from(err: ConfigError) -> Self {
        PatentError::ConfigError(err.to_string())
    }
}

/// Wire protocol spoken by the model endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI-compatible chat completions
    OpenAi,
}

impl Provider {
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Anthropic => ANTHROPIC_ENDPOINT,
            Provider::OpenAi => OPENAI_ENDPOINT,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub provider: Provider,

    /// API key for the LLM service. Falls back to the provider's environment variable.
    pub api_key: Option<String>,

    /// API endpoint. Falls back to the provider's public endpoint.
    pub api_endpoint: Option<String>,

    /// Model identifier
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            provider: Provider::Anthropic,
            api_key: None,
            api_endpoint: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Sampling temperature per agent role
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoleTemperatures {
    pub examiner: f32,
    pub fact_checker: f32,
    pub planner: f32,
}

impl Default for RoleTemperatures {
    fn default() -> Self {
        // Examiner samples hot to encourage reasoning; the others stay conservative
        Self {
            examiner: 1.0,
            fact_checker: 0.2,
            planner: 0.2,
        }
    }
}

impl RoleTemperatures {
    pub fn for_role(&self, role: AgentRole) -> f32 {
        match role {
            AgentRole::Examiner => self.examiner,
            AgentRole::FactChecker => self.fact_checker,
            AgentRole::Planner => self.planner,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Configuration for the LLM endpoint
    pub llm_api: ApiConfig,

    /// Maximum tokens per model response
    pub max_tokens: usize,

    pub temperatures: RoleTemperatures,

    /// Deadline for a single model call, or for each wait on a stream fragment
    pub request_timeout_secs: u64,

    pub retry: RetryPolicy,

    pub budgets: PromptBudgets,

    /// Template overrides by name, e.g. `examiner.user`
    pub prompt_templates: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            llm_api: ApiConfig::default(),
            max_tokens: 4096,
            temperatures: RoleTemperatures::default(),
            request_timeout_secs: 120,
            retry: RetryPolicy::default(),
            budgets: PromptBudgets::default(),
            prompt_templates: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: ClientConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// `MODEL_ID` and `PATENTFINDER_API_ENDPOINT` take precedence over file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("MODEL_ID") {
            if !model.trim().is_empty() {
                log::debug!("Model overridden by MODEL_ID: {}", model);
                self.llm_api.model = model;
            }
        }
        if let Ok(endpoint) = std::env::var("PATENTFINDER_API_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                log::debug!("Endpoint overridden by PATENTFINDER_API_ENDPOINT: {}", endpoint);
                self.llm_api.api_endpoint = Some(endpoint);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue("llm_api.model must not be empty".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("retry.max_attempts must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Get the API key, checking the provider's environment variable if not in config
    pub fn get_api_key(&self) -> Result<String, ConfigError> {
        if let Some(api_key) = &self.llm_api.api_key {
            log::debug!("Using API key from config");
            return Ok(api_key.clone());
        }

        let env_var = self.llm_api.provider.api_key_env();
        std::env::var(env_var).map_err(|_| ConfigError::MissingApiKey(env_var.to_string()))
    }

    pub fn endpoint(&self) -> String {
        self.llm_api.api_endpoint
            .clone()
            .unwrap_or_else(|| self.llm_api.provider.default_endpoint().to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
