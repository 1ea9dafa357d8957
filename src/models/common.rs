use serde::{ Deserialize, Serialize };
use std::fmt;

/// The five stages of an infringement assessment, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStep {
    MarkushExtraction,
    SubstituentMatching,
    RequirementsExamination,
    FactCheck,
    ReportPlanning,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 5] = [
        PipelineStep::MarkushExtraction,
        PipelineStep::SubstituentMatching,
        PipelineStep::RequirementsExamination,
        PipelineStep::FactCheck,
        PipelineStep::ReportPlanning,
    ];

    /// 1-based position of the step in the pipeline
    pub fn number(&self) -> usize {
        match self {
            PipelineStep::MarkushExtraction => 1,
            PipelineStep::SubstituentMatching => 2,
            PipelineStep::RequirementsExamination => 3,
            PipelineStep::FactCheck => 4,
            PipelineStep::ReportPlanning => 5,
        }
    }

    /// Whether the step is backed by a language model call
    pub fn uses_model(&self) -> bool {
        matches!(
            self,
            PipelineStep::RequirementsExamination |
                PipelineStep::FactCheck |
                PipelineStep::ReportPlanning
        )
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::MarkushExtraction => write!(f, "Markush extraction"),
            PipelineStep::SubstituentMatching => write!(f, "Substituent matching"),
            PipelineStep::RequirementsExamination => write!(f, "Requirements examination"),
            PipelineStep::FactCheck => write!(f, "Fact check"),
            PipelineStep::ReportPlanning => write!(f, "Report planning"),
        }
    }
}

/// Model-backed agent roles. Each role has its own system prompt and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Examiner,
    FactChecker,
    Planner,
}

impl AgentRole {
    /// Prefix used for this role's template names, e.g. `examiner.system`
    pub fn template_prefix(&self) -> &'static str {
        match self {
            AgentRole::Examiner => "examiner",
            AgentRole::FactChecker => "fact_checker",
            AgentRole::Planner => "planner",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRole::Examiner => write!(f, "Requirements Examiner"),
            AgentRole::FactChecker => write!(f, "Fact Checker"),
            AgentRole::Planner => write!(f, "Planner"),
        }
    }
}

/// How the model-backed steps consume responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Blocking,
    Streaming,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Blocking
    }
}

/// Infringement determination carried by the examiner's `VERDICT:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Protected,
    NotProtected,
    Undetermined,
}

impl Verdict {
    /// The token the examiner is asked to emit after `VERDICT:`
    pub fn token(&self) -> &'static str {
        match self {
            Verdict::Protected => "PROTECTED",
            Verdict::NotProtected => "NOT_PROTECTED",
            Verdict::Undetermined => "UNDETERMINED",
        }
    }

    /// Parse the last `VERDICT:` line of a model response.
    ///
    /// Prose elsewhere in the response is never inspected, so a quoted
    /// "NOT PROTECTED" inside the rationale cannot flip the result.
    pub fn parse_from_response(text: &str) -> Verdict {
        text.lines()
            .rev()
            .filter_map(|line| {
                let line = line.trim().trim_matches(|c: char| c == '*' || c == '`' || c == '#').trim();
                let (key, value) = line.split_once(':')?;
                if !key.trim().eq_ignore_ascii_case("verdict") {
                    return None;
                }
                Some(value.trim().trim_matches(|c: char| c == '*' || c == '`').trim().to_string())
            })
            .next()
            .map(|token| Verdict::from_token(&token))
            .unwrap_or(Verdict::Undetermined)
    }

    fn from_token(token: &str) -> Verdict {
        let token = token.trim().trim_end_matches(['.', '!']).trim_end();
        let normalized = token.to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "PROTECTED" => Verdict::Protected,
            "NOT_PROTECTED" => Verdict::NotProtected,
            _ => Verdict::Undetermined,
        }
    }

    /// Flag handed to the fact checker. Undetermined counts as not protected.
    pub fn is_protected(&self) -> bool {
        matches!(self, Verdict::Protected)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Protected => write!(f, "PROTECTED"),
            Verdict::NotProtected => write!(f, "NOT PROTECTED"),
            Verdict::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}
