use std::collections::HashMap;

use log::{ info, warn };

use crate::errors::PatentResult;
use crate::implementations::agent::{ budgeted, AgentContext };
use crate::models::common::{ AgentRole, Verdict };
use crate::models::matching::MatchResult;
use crate::models::report::ExaminationVerdict;
use crate::traits::TextStream;

/// Step 3: judges each assigned substituent against the claim requirements
#[derive(Clone)]
pub struct RequirementsExaminer {
    context: AgentContext,
}

impl RequirementsExaminer {
    pub fn new(context: AgentContext) -> Self {
        Self { context }
    }

    fn params(
        &self,
        markush_string: &str,
        molecule_string: &str,
        match_result: &MatchResult,
        claim_text: &str
    ) -> HashMap<&'static str, String> {
        let claim_text = budgeted(
            "examiner claim text",
            claim_text,
            self.context.budgets.examiner_claim_chars
        );

        let mut params = HashMap::new();
        params.insert("markush_string", markush_string.to_string());
        params.insert("molecule_string", molecule_string.to_string());
        params.insert("r_group_mapping", format_mapping(match_result));
        params.insert("disputed_groups", format_disputed(match_result));
        params.insert("claim_text", claim_text);
        params
    }

    pub async fn examine(
        &self,
        markush_string: &str,
        molecule_string: &str,
        match_result: &MatchResult,
        claim_text: &str
    ) -> PatentResult<String> {
        info!("Examining claim requirements for {}", molecule_string);
        let params = self.params(markush_string, molecule_string, match_result, claim_text);
        let request = self.context.request(AgentRole::Examiner, &params)?;
        self.context.complete(&request).await
    }

    pub async fn examine_stream(
        &self,
        markush_string: &str,
        molecule_string: &str,
        match_result: &MatchResult,
        claim_text: &str
    ) -> PatentResult<TextStream> {
        info!("Examining claim requirements for {} (streaming)", molecule_string);
        let params = self.params(markush_string, molecule_string, match_result, claim_text);
        let request = self.context.request(AgentRole::Examiner, &params)?;
        self.context.stream(&request).await
    }
}

/// Parse the examiner's full text, warning when no usable verdict line is present
pub fn interpret(text: String) -> ExaminationVerdict {
    let examination = ExaminationVerdict::from_response(text);
    match examination.verdict {
        Verdict::Undetermined =>
            warn!("Examiner response has no usable VERDICT line; treating as not protected"),
        verdict => info!("Examiner verdict: {}", verdict),
    }
    examination
}

fn format_mapping(match_result: &MatchResult) -> String {
    if match_result.r_group_mapping.is_empty() {
        return "(no groups)".to_string();
    }
    match_result.r_group_mapping
        .iter()
        .map(|(group, value)| {
            if value.is_empty() {
                format!("- {}: (no assignment)", group)
            } else {
                format!("- {}: `{}`", group, value)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_disputed(match_result: &MatchResult) -> String {
    let lines: Vec<String> = match_result
        .disputed()
        .map(|a| {
            format!(
                "- {} ({}): rule-based `{}`, learned `{}`",
                a.group_id,
                a.status,
                a.rule_based_value.as_deref().unwrap_or("none"),
                a.learned_value.as_deref().unwrap_or("none")
            )
        })
        .collect();
    if lines.is_empty() {
        "None. Both estimators agree on every group.".to_string()
    } else {
        lines.join("\n")
    }
}
