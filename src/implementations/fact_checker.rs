use std::collections::HashMap;

use log::info;

use crate::errors::PatentResult;
use crate::implementations::agent::{ budgeted, AgentContext };
use crate::models::common::AgentRole;
use crate::traits::TextStream;

/// Step 4: checks the examiner's evidence against the patent text. Advisory only.
#[derive(Clone)]
pub struct FactChecker {
    context: AgentContext,
}

impl FactChecker {
    pub fn new(context: AgentContext) -> Self {
        Self { context }
    }

    fn params(
        &self,
        target_molecule: &str,
        block_text: &str,
        is_protected: bool,
        reasoning_text: &str
    ) -> HashMap<&'static str, String> {
        let budgets = &self.context.budgets;
        let status = if is_protected { "protected" } else { "not protected" };

        let mut params = HashMap::new();
        params.insert("target_molecule", target_molecule.to_string());
        params.insert(
            "block_text",
            budgeted("fact-check block text", block_text, budgets.fact_check_block_chars)
        );
        params.insert("protection_status", status.to_string());
        params.insert(
            "reasoning_text",
            budgeted("fact-check reasoning", reasoning_text, budgets.fact_check_reasoning_chars)
        );
        params
    }

    pub async fn check(
        &self,
        target_molecule: &str,
        block_text: &str,
        is_protected: bool,
        reasoning_text: &str
    ) -> PatentResult<String> {
        info!("Fact-checking analysis of {}", target_molecule);
        let params = self.params(target_molecule, block_text, is_protected, reasoning_text);
        let request = self.context.request(AgentRole::FactChecker, &params)?;
        self.context.complete(&request).await
    }

    pub async fn check_stream(
        &self,
        target_molecule: &str,
        block_text: &str,
        is_protected: bool,
        reasoning_text: &str
    ) -> PatentResult<TextStream> {
        info!("Fact-checking analysis of {} (streaming)", target_molecule);
        let params = self.params(target_molecule, block_text, is_protected, reasoning_text);
        let request = self.context.request(AgentRole::FactChecker, &params)?;
        self.context.stream(&request).await
    }
}
