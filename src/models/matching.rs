use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;
use std::fmt;

/// The two independent estimators run by the substituent matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Rule-based structural matcher: precise on simple groups, brittle on complex ones
    RuleBased,
    /// Learned matcher: more robust, less standard output notation
    Learned,
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorKind::RuleBased => write!(f, "rule-based"),
            EstimatorKind::Learned => write!(f, "learned"),
        }
    }
}

/// Raw output of a single estimator, kept on the match result for traceability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorOutput {
    pub kind: EstimatorKind,
    /// Human readable method name
    pub method: String,
    pub skeleton_match: bool,
    /// Substituent SMILES per canonical group id. Groups the estimator has no data for are absent.
    pub r_group_mapping: BTreeMap<String, String>,
    pub confidence: f64,
    pub notes: String,
}

/// Outcome of reconciling both estimators for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Identical strings
    Agreed,
    /// Different notation, same fragment
    Equivalent,
    /// Estimators disagree; left to the examiner to adjudicate
    Disputed,
    RuleBasedOnly,
    LearnedOnly,
    /// Neither estimator produced a value
    Missing,
}

impl MatchStatus {
    pub fn needs_adjudication(&self) -> bool {
        matches!(self, MatchStatus::Disputed | MatchStatus::Missing)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Agreed => write!(f, "agreed"),
            MatchStatus::Equivalent => write!(f, "equivalent (notation differs)"),
            MatchStatus::Disputed => write!(f, "DISPUTED"),
            MatchStatus::RuleBasedOnly => write!(f, "rule-based only"),
            MatchStatus::LearnedOnly => write!(f, "learned only"),
            MatchStatus::Missing => write!(f, "MISSING"),
        }
    }
}

/// Per-group comparison record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstituentAnalysis {
    pub group_id: String,
    pub atom_index: Option<usize>,
    pub rule_based_value: Option<String>,
    pub learned_value: Option<String>,
    /// Value placed in the merged mapping
    pub verified_value: String,
    /// Short chemical description of the verified fragment
    pub description: String,
    pub status: MatchStatus,
}

/// Merged substituent assignment for a query molecule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub query_molecule: String,
    pub markush_string: String,
    pub skeleton_match: bool,
    /// One entry per claim group id; empty string when no estimator had data
    pub r_group_mapping: BTreeMap<String, String>,
    pub substituent_analysis: Vec<SubstituentAnalysis>,
    /// Tanimoto similarity reported by the learned estimator, in [0, 1]
    pub similarity_score: f64,
    pub rule_based: EstimatorOutput,
    pub learned: EstimatorOutput,
    pub verification_notes: String,
}

impl MatchResult {
    /// Groups the examiner has to adjudicate
    pub fn disputed(&self) -> impl Iterator<Item = &SubstituentAnalysis> {
        self.substituent_analysis.iter().filter(|a| a.status.needs_adjudication())
    }

    pub fn analysis(&self, group_id: &str) -> Option<&SubstituentAnalysis> {
        self.substituent_analysis.iter().find(|a| a.group_id == group_id)
    }
}
