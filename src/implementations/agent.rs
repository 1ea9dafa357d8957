use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::config::{ truncate_chars, PromptBudgets };
use crate::errors::PatentResult;
use crate::implementations::config::{ ClientConfig, RoleTemperatures };
use crate::implementations::prompts::{ system_template, user_template, PromptLibrary };
use crate::models::common::AgentRole;
use crate::traits::{ ModelClient, ModelRequest, TextStream };

/// What the three model-backed agents share: the client handle, templates,
/// temperatures and truncation budgets.
#[derive(Clone)]
pub struct AgentContext {
    pub client: Arc<dyn ModelClient>,
    pub prompts: Arc<PromptLibrary>,
    pub temperatures: RoleTemperatures,
    pub budgets: PromptBudgets,
}

impl AgentContext {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            prompts: Arc::new(PromptLibrary::default()),
            temperatures: RoleTemperatures::default(),
            budgets: PromptBudgets::default(),
        }
    }

    pub fn from_config(client: Arc<dyn ModelClient>, config: &ClientConfig) -> Self {
        Self {
            client,
            prompts: Arc::new(PromptLibrary::with_overrides(&config.prompt_templates)),
            temperatures: config.temperatures.clone(),
            budgets: config.budgets.clone(),
        }
    }

    /// Render both templates of `role` into a request
    pub(crate) fn request(
        &self,
        role: AgentRole,
        params: &HashMap<&str, String>
    ) -> PatentResult<ModelRequest> {
        let system_prompt = self.prompts.render(&system_template(role), &HashMap::new())?;
        let user_prompt = self.prompts.render(&user_template(role), params)?;
        debug!(
            "{} prompt: {} system chars, {} user chars",
            role,
            system_prompt.chars().count(),
            user_prompt.chars().count()
        );
        debug!("{} user prompt:\n{}", role, user_prompt);
        Ok(ModelRequest {
            role,
            system_prompt,
            user_prompt,
            temperature: self.temperatures.for_role(role),
        })
    }

    pub(crate) async fn complete(&self, request: &ModelRequest) -> PatentResult<String> {
        let text = self.client.complete(request).await?;
        debug!("{} response: {} chars", request.role, text.chars().count());
        Ok(text)
    }

    pub(crate) async fn stream(&self, request: &ModelRequest) -> PatentResult<TextStream> {
        self.client.stream(request).await
    }
}

/// Truncate `text` to `budget` chars, logging when anything is dropped
pub(crate) fn budgeted(label: &str, text: &str, budget: usize) -> String {
    let truncated = truncate_chars(text, budget);
    if truncated.len() < text.len() {
        debug!(
            "Truncated {} from {} to {} chars",
            label,
            text.chars().count(),
            budget
        );
    }
    truncated.into_owned()
}
