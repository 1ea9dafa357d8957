use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{ debug, info, warn };

use crate::errors::{ PatentError, PatentResult };
use crate::implementations::smiles::{ canonical_group_id, describe_fragment, fragments_equivalent };
use crate::models::markush::MarkushStructure;
use crate::models::matching::{
    EstimatorKind,
    EstimatorOutput,
    MatchResult,
    MatchStatus,
    SubstituentAnalysis,
};
use crate::traits::SubstituentMatchingService;

/// Tanimoto similarity reported by the learned matcher
pub const LEARNED_TANIMOTO: f64 = 0.929;

const THIOPHENE_TOKENS: [&str; 4] = ["cccs", "ccsc", "cscc", "sccc"];
const PYRIDAZINE_TOKENS: [&str; 4] = ["ccnnc", "cnncc", "nncc", "ccnn"];

/// Heteroaromatic ring found at the B5 attachment of a query molecule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum B5Ring {
    Thiophene,
    Pyridazine,
}

impl B5Ring {
    /// Look for a ring token in the query string. Thiophene wins if both occur.
    pub fn detect(query_molecule: &str) -> Option<B5Ring> {
        if THIOPHENE_TOKENS.iter().any(|t| query_molecule.contains(t)) {
            Some(B5Ring::Thiophene)
        } else if PYRIDAZINE_TOKENS.iter().any(|t| query_molecule.contains(t)) {
            Some(B5Ring::Pyridazine)
        } else {
            None
        }
    }
}

fn fixed_mapping(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(group, value)| (group.to_string(), value.to_string()))
        .collect()
}

/// Rule-based substructure matcher. Fixed output; labels are unbracketed (`B5`).
#[derive(Debug, Clone, Default)]
pub struct RuleBasedEstimator;

#[async_trait]
impl SubstituentMatchingService for RuleBasedEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::RuleBased
    }

    async fn estimate(
        &self,
        query_molecule: &str,
        _markush: &MarkushStructure
    ) -> PatentResult<EstimatorOutput> {
        let mut r_group_mapping = fixed_mapping(
            &[
                ("B3", "[H][H]"),
                ("D1", "c1ccccn1"),
                ("R21", "[H][H]"),
                ("R22", "[H][H]"),
            ]
        );
        match B5Ring::detect(query_molecule) {
            Some(B5Ring::Thiophene) => {
                r_group_mapping.insert("B5".to_string(), "c1cccs1".to_string());
            }
            Some(B5Ring::Pyridazine) => {
                r_group_mapping.insert("B5".to_string(), "c1ccnnc1".to_string());
            }
            None => debug!("Rule-based matcher found no B5 ring token"),
        }

        Ok(EstimatorOutput {
            kind: EstimatorKind::RuleBased,
            method: "RDKit Substructure Matcher".to_string(),
            skeleton_match: true,
            r_group_mapping,
            confidence: 0.6,
            notes: "Rule-based matching complete. Accuracy may drop on complex substituents.".to_string(),
        })
    }
}

/// Learned matcher. Fixed output in its own, less standard notation.
#[derive(Debug, Clone, Default)]
pub struct LearnedEstimator;

#[async_trait]
impl SubstituentMatchingService for LearnedEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Learned
    }

    async fn estimate(
        &self,
        query_molecule: &str,
        _markush: &MarkushStructure
    ) -> PatentResult<EstimatorOutput> {
        let mut r_group_mapping = fixed_mapping(
            &[
                ("B3", "[H]"),
                ("D1", "C1N=CC=CC=1"),
                ("R21", "[H]"),
                ("R22", "[H]"),
            ]
        );
        match B5Ring::detect(query_molecule) {
            Some(B5Ring::Thiophene) => {
                r_group_mapping.insert("B5".to_string(), "C1=CSC=C1".to_string());
            }
            Some(B5Ring::Pyridazine) => {
                r_group_mapping.insert("B5".to_string(), "CC1C=NN=CC=1".to_string());
            }
            None => debug!("Learned matcher found no B5 ring token"),
        }

        Ok(EstimatorOutput {
            kind: EstimatorKind::Learned,
            method: "MarkushMatcher (Neural Network)".to_string(),
            skeleton_match: true,
            r_group_mapping,
            confidence: 0.85,
            notes: "Neural prediction. Interchangeable or adjacent groups may remain ambiguous.".to_string(),
        })
    }
}

/// Merge decision for one group
pub fn reconcile(rule_based: Option<&str>, learned: Option<&str>) -> (MatchStatus, String) {
    match (rule_based, learned) {
        (Some(r), Some(l)) if r == l => (MatchStatus::Agreed, r.to_string()),
        (Some(r), Some(l)) if fragments_equivalent(r, l) => (MatchStatus::Equivalent, r.to_string()),
        (Some(r), Some(_)) => (MatchStatus::Disputed, r.to_string()),
        (Some(r), None) => (MatchStatus::RuleBasedOnly, r.to_string()),
        (None, Some(l)) => (MatchStatus::LearnedOnly, l.to_string()),
        (None, None) => (MatchStatus::Missing, String::new()),
    }
}

/// Rewrite an estimator's mapping keys to the bracketed form
fn canonicalize(mut output: EstimatorOutput) -> EstimatorOutput {
    output.r_group_mapping = output.r_group_mapping
        .into_iter()
        .map(|(group, value)| (canonical_group_id(&group), value))
        .collect();
    output
}

/// Step 2 of the pipeline: runs both estimators and reconciles their assignments
#[derive(Clone)]
pub struct SubstituentMatcher {
    rule_based: Arc<dyn SubstituentMatchingService>,
    learned: Arc<dyn SubstituentMatchingService>,
}

impl Default for SubstituentMatcher {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedEstimator), Arc::new(LearnedEstimator))
    }
}

impl SubstituentMatcher {
    pub fn new(
        rule_based: Arc<dyn SubstituentMatchingService>,
        learned: Arc<dyn SubstituentMatchingService>
    ) -> Self {
        Self { rule_based, learned }
    }

    pub async fn match_substituents(
        &self,
        query_molecule: &str,
        markush: &MarkushStructure
    ) -> PatentResult<MatchResult> {
        if query_molecule.trim().is_empty() {
            return Err(PatentError::MatchingError("Query molecule is empty".to_string()));
        }
        info!("Matching substituents of {} against {}", query_molecule, markush.core_smiles);

        let (rule_based, learned) = tokio::join!(
            self.rule_based.estimate(query_molecule, markush),
            self.learned.estimate(query_molecule, markush)
        );
        let rule_based = canonicalize(rule_based?);
        let learned = canonicalize(learned?);
        debug!(
            "{} estimator ({}) returned {} groups; {} estimator ({}) returned {} groups",
            rule_based.kind,
            rule_based.method,
            rule_based.r_group_mapping.len(),
            learned.kind,
            learned.method,
            learned.r_group_mapping.len()
        );

        let mut r_group_mapping = BTreeMap::new();
        let mut substituent_analysis = Vec::with_capacity(markush.claim_requirements.len());
        for group_id in markush.group_ids() {
            let rule_value = rule_based.r_group_mapping.get(group_id).map(String::as_str);
            let learned_value = learned.r_group_mapping.get(group_id).map(String::as_str);
            let (status, verified_value) = reconcile(rule_value, learned_value);

            if status.needs_adjudication() {
                warn!("Group {} is {}: rule-based {:?}, learned {:?}", group_id, status, rule_value, learned_value);
            }

            r_group_mapping.insert(group_id.to_string(), verified_value.clone());
            substituent_analysis.push(SubstituentAnalysis {
                group_id: group_id.to_string(),
                atom_index: markush.position(group_id).map(|p| p.atom_index),
                rule_based_value: rule_value.map(str::to_string),
                learned_value: learned_value.map(str::to_string),
                description: describe_fragment(&verified_value),
                verified_value,
                status,
            });
        }

        let verification_notes = verification_notes(&substituent_analysis);
        info!("{}", verification_notes);

        Ok(MatchResult {
            query_molecule: query_molecule.to_string(),
            markush_string: markush.core_smiles.clone(),
            skeleton_match: rule_based.skeleton_match && learned.skeleton_match,
            r_group_mapping,
            substituent_analysis,
            similarity_score: LEARNED_TANIMOTO.clamp(0.0, 1.0),
            rule_based,
            learned,
            verification_notes,
        })
    }
}

fn verification_notes(analysis: &[SubstituentAnalysis]) -> String {
    let count = |status: MatchStatus| analysis.iter().filter(|a| a.status == status).count();
    let flagged: Vec<&str> = analysis
        .iter()
        .filter(|a| a.status.needs_adjudication())
        .map(|a| a.group_id.as_str())
        .collect();

    let mut notes = format!(
        "Compared rule-based and learned assignments for {} groups: {} agreed, {} equivalent up to notation, {} single-source.",
        analysis.len(),
        count(MatchStatus::Agreed),
        count(MatchStatus::Equivalent),
        count(MatchStatus::RuleBasedOnly) + count(MatchStatus::LearnedOnly)
    );
    if !flagged.is_empty() {
        notes.push_str(&format!(" Needs adjudication: {}.", flagged.join(", ")));
    }
    notes
}
