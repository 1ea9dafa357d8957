use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

use crate::errors::{ PatentError, PatentResult };
use crate::models::common::{ ExecutionMode, Verdict };
use crate::models::markush::MarkushStructure;
use crate::models::matching::MatchResult;

/// Request-scoped pipeline input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Query molecule SMILES
    pub query_molecule: String,
    /// Patent claim text, optionally containing extended-SMILES Markush structures
    pub patent_text: String,
}

impl AssessmentRequest {
    pub fn new(query_molecule: impl Into<String>, patent_text: impl Into<String>) -> Self {
        Self {
            query_molecule: query_molecule.into(),
            patent_text: patent_text.into(),
        }
    }

    /// Reject empty inputs before any step runs
    pub fn validate(&self) -> PatentResult<()> {
        if self.query_molecule.trim().is_empty() {
            return Err(PatentError::InvalidInput("Query molecule is required".to_string()));
        }
        if self.patent_text.trim().is_empty() {
            return Err(PatentError::InvalidInput("Patent claim text is required".to_string()));
        }
        Ok(())
    }
}

/// Output of the requirements examiner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExaminationVerdict {
    /// Full model response, Markdown
    pub text: String,
    /// Parsed from the response's `VERDICT:` line
    pub verdict: Verdict,
}

impl ExaminationVerdict {
    pub fn from_response(text: String) -> Self {
        let verdict = Verdict::parse_from_response(&text);
        Self { text, verdict }
    }
}

/// Output of the fact checker. Advisory; never alters the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub text: String,
}

/// Final Markdown report produced by the planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfringementReport {
    pub markdown: String,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub request: AssessmentRequest,
    pub model: String,
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub markush: MarkushStructure,
    pub match_result: MatchResult,
    pub examination: ExaminationVerdict,
    pub fact_check: FactCheckResult,
    pub report: InfringementReport,
}

impl AssessmentReport {
    pub fn verdict(&self) -> Verdict {
        self.examination.verdict
    }

    /// Render every step into one Markdown document
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Patent Infringement Assessment\n\n");
        out.push_str(&format!("- Query molecule: `{}`\n", self.request.query_molecule));
        out.push_str(&format!("- Model: {}\n", self.model));
        out.push_str(&format!("- Started: {}\n", self.started_at.to_rfc3339()));
        out.push_str(&format!("- Verdict: **{}**\n\n", self.verdict()));

        out.push_str("## 1. Markush Structure\n\n");
        out.push_str(&format!("```\n{}\n```\n\n", self.markush.core_smiles));
        for (group, requirement) in &self.markush.claim_requirements {
            out.push_str(&format!("- **{}**: {}\n", group, requirement));
        }

        out.push_str("\n## 2. Substituent Matching\n\n");
        out.push_str("| Group | Rule-based | Learned | Verified | Status |\n");
        out.push_str("|---|---|---|---|---|\n");
        for a in &self.match_result.substituent_analysis {
            out.push_str(
                &format!(
                    "| {} | `{}` | `{}` | `{}` | {} |\n",
                    a.group_id,
                    a.rule_based_value.as_deref().unwrap_or("-"),
                    a.learned_value.as_deref().unwrap_or("-"),
                    a.verified_value,
                    a.status
                )
            );
        }
        out.push_str(
            &format!("\nTanimoto similarity: {:.3}\n\n", self.match_result.similarity_score)
        );

        out.push_str("## 3. Requirements Examination\n\n");
        out.push_str(&self.examination.text);
        out.push_str("\n\n## 4. Fact Check\n\n");
        out.push_str(&self.fact_check.text);
        out.push_str("\n\n## 5. Infringement Report\n\n");
        out.push_str(&self.report.markdown);
        out.push('\n');
        out
    }
}
