use std::collections::HashMap;

use log::info;

use crate::errors::PatentResult;
use crate::implementations::agent::{ budgeted, AgentContext };
use crate::models::common::AgentRole;
use crate::models::markush::MarkushStructure;
use crate::models::matching::MatchResult;
use crate::traits::TextStream;

/// Step 5: compiles every earlier output into the final infringement report
#[derive(Clone)]
pub struct Planner {
    context: AgentContext,
}

impl Planner {
    pub fn new(context: AgentContext) -> Self {
        Self { context }
    }

    fn params(
        &self,
        query_molecule: &str,
        patent_info: &str,
        sketch_result: &MarkushStructure,
        matcher_result: &MatchResult,
        examiner_text: &str,
        fact_check_text: &str
    ) -> HashMap<&'static str, String> {
        let claim_requirements = sketch_result.claim_requirements
            .iter()
            .map(|(group, text)| format!("- {}: {}", group, text))
            .collect::<Vec<_>>()
            .join("\n");
        let r_group_mapping = matcher_result.substituent_analysis
            .iter()
            .map(|a| format!("- {}: `{}` ({}, {})", a.group_id, a.verified_value, a.description, a.status))
            .collect::<Vec<_>>()
            .join("\n");

        let mut params = HashMap::new();
        params.insert("query_molecule", query_molecule.to_string());
        params.insert(
            "patent_info",
            budgeted("planner patent text", patent_info, self.context.budgets.planner_patent_chars)
        );
        params.insert("core_markush", sketch_result.core_smiles.clone());
        params.insert("claim_requirements", claim_requirements);
        params.insert("r_group_mapping", r_group_mapping);
        params.insert("skeleton_match", matcher_result.skeleton_match.to_string());
        params.insert("examiner_text", examiner_text.to_string());
        params.insert("fact_check_text", fact_check_text.to_string());
        params
    }

    pub async fn plan(
        &self,
        query_molecule: &str,
        patent_info: &str,
        sketch_result: &MarkushStructure,
        matcher_result: &MatchResult,
        examiner_text: &str,
        fact_check_text: &str
    ) -> PatentResult<String> {
        info!("Compiling infringement report for {}", query_molecule);
        let params = self.params(
            query_molecule,
            patent_info,
            sketch_result,
            matcher_result,
            examiner_text,
            fact_check_text
        );
        let request = self.context.request(AgentRole::Planner, &params)?;
        self.context.complete(&request).await
    }

    pub async fn plan_stream(
        &self,
        query_molecule: &str,
        patent_info: &str,
        sketch_result: &MarkushStructure,
        matcher_result: &MatchResult,
        examiner_text: &str,
        fact_check_text: &str
    ) -> PatentResult<TextStream> {
        info!("Compiling infringement report for {} (streaming)", query_molecule);
        let params = self.params(
            query_molecule,
            patent_info,
            sketch_result,
            matcher_result,
            examiner_text,
            fact_check_text
        );
        let request = self.context.request(AgentRole::Planner, &params)?;
        self.context.stream(&request).await
    }
}
