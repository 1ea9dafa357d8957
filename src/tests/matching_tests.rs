use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ PatentError, PatentResult };
use crate::implementations::markush_extractor::MarkushExtractor;
use crate::implementations::substituent_matcher::{
    reconcile,
    B5Ring,
    LearnedEstimator,
    RuleBasedEstimator,
    SubstituentMatcher,
    LEARNED_TANIMOTO,
};
use crate::models::markush::MarkushStructure;
use crate::models::matching::{ EstimatorKind, EstimatorOutput, MatchStatus };
use crate::samples::{ SAMPLE_PATENT_CLAIM, SAMPLE_PROTECTED_MOLECULE, SAMPLE_QUERY_MOLECULE };
use crate::traits::SubstituentMatchingService;

async fn case_study_markush() -> MarkushStructure {
    MarkushExtractor::default().extract(SAMPLE_PATENT_CLAIM).await.unwrap()
}

/// Learned estimator that puts a benzene ring at B5
struct PhenylEstimator;

#[async_trait]
impl SubstituentMatchingService for PhenylEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Learned
    }

    async fn estimate(&self, _query: &str, _markush: &MarkushStructure) -> PatentResult<EstimatorOutput> {
        let mut r_group_mapping = BTreeMap::new();
        r_group_mapping.insert("B5".to_string(), "c1ccccc1".to_string());
        r_group_mapping.insert("D1".to_string(), "c1ccccn1".to_string());
        Ok(EstimatorOutput {
            kind: EstimatorKind::Learned,
            method: "phenyl stub".to_string(),
            skeleton_match: false,
            r_group_mapping,
            confidence: 0.5,
            notes: String::new(),
        })
    }
}

struct BrokenEstimator;

#[async_trait]
impl SubstituentMatchingService for BrokenEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::RuleBased
    }

    async fn estimate(&self, _query: &str, _markush: &MarkushStructure) -> PatentResult<EstimatorOutput> {
        Err(PatentError::MatchingError("model weights not loaded".to_string()))
    }
}

#[test]
fn reconcile_covers_every_status() {
    assert_eq!(reconcile(Some("C"), Some("C")), (MatchStatus::Agreed, "C".to_string()));
    assert_eq!(
        reconcile(Some("c1ccnnc1"), Some("CC1C=NN=CC=1")),
        (MatchStatus::Equivalent, "c1ccnnc1".to_string())
    );
    assert_eq!(
        reconcile(Some("c1cccs1"), Some("c1ccnnc1")),
        (MatchStatus::Disputed, "c1cccs1".to_string())
    );
    assert_eq!(reconcile(Some("[H]"), None), (MatchStatus::RuleBasedOnly, "[H]".to_string()));
    assert_eq!(reconcile(None, Some("[H]")), (MatchStatus::LearnedOnly, "[H]".to_string()));
    assert_eq!(reconcile(None, None), (MatchStatus::Missing, String::new()));
}

#[test]
fn ring_versus_chain_is_disputed() {
    assert_eq!(reconcile(Some("c1ccccc1"), Some("C")).0, MatchStatus::Disputed);
    assert_eq!(reconcile(Some("c1cccs1"), Some("CS")).0, MatchStatus::Disputed);
    assert_eq!(reconcile(Some("c1ccccn1"), Some("CN")).0, MatchStatus::Disputed);
    // Saturated ring against aromatic ring with the same heteroatoms
    assert_eq!(reconcile(Some("c1ccccn1"), Some("C1CCNCC1")).0, MatchStatus::Disputed);
    // Kekulé and aromatic forms of one ring still agree
    assert_eq!(reconcile(Some("c1ccnnc1"), Some("CC1C=NN=CC=1")).0, MatchStatus::Equivalent);
}

#[test]
fn b5_ring_detection() {
    assert_eq!(B5Ring::detect(SAMPLE_PROTECTED_MOLECULE), Some(B5Ring::Thiophene));
    assert_eq!(B5Ring::detect(SAMPLE_QUERY_MOLECULE), Some(B5Ring::Pyridazine));
    assert_eq!(B5Ring::detect("c1ccccc1"), None);
    // Thiophene wins when both tokens occur
    assert_eq!(B5Ring::detect("ccnnc.cccs"), Some(B5Ring::Thiophene));
}

#[tokio::test]
async fn estimators_use_their_own_notation() {
    let markush = case_study_markush().await;
    let rule = RuleBasedEstimator.estimate(SAMPLE_QUERY_MOLECULE, &markush).await.unwrap();
    let learned = LearnedEstimator.estimate(SAMPLE_QUERY_MOLECULE, &markush).await.unwrap();

    assert_eq!(rule.r_group_mapping.get("B5").map(String::as_str), Some("c1ccnnc1"));
    assert_eq!(learned.r_group_mapping.get("B5").map(String::as_str), Some("CC1C=NN=CC=1"));
    assert_eq!(rule.confidence, 0.6);
    assert_eq!(learned.confidence, 0.85);
}

#[tokio::test]
async fn mapping_covers_exactly_the_claimed_groups() {
    let markush = case_study_markush().await;
    let result = SubstituentMatcher::default()
        .match_substituents(SAMPLE_QUERY_MOLECULE, &markush).await
        .unwrap();

    let mapped: Vec<&str> = result.r_group_mapping.keys().map(String::as_str).collect();
    let claimed: Vec<&str> = markush.group_ids().collect();
    assert_eq!(mapped, claimed);
    assert_eq!(result.substituent_analysis.len(), claimed.len());
}

#[tokio::test]
async fn pyridazine_query_prefers_rule_based_values() {
    let markush = case_study_markush().await;
    let result = SubstituentMatcher::default()
        .match_substituents(SAMPLE_QUERY_MOLECULE, &markush).await
        .unwrap();

    assert_eq!(result.r_group_mapping["B[5]"], "c1ccnnc1");
    assert_eq!(result.r_group_mapping["D[1]"], "c1ccccn1");
    assert_eq!(result.r_group_mapping["B[3]"], "[H][H]");
    assert_eq!(result.r_group_mapping["R[21]"], "[H][H]");
    assert_eq!(result.r_group_mapping["R[22]"], "[H][H]");

    let b5 = result.analysis("B[5]").unwrap();
    assert_eq!(b5.status, MatchStatus::Equivalent);
    assert_eq!(b5.learned_value.as_deref(), Some("CC1C=NN=CC=1"));
    assert_eq!(b5.atom_index, Some(0));
    assert_eq!(b5.description, "Pyridazine ring");

    assert!(result.skeleton_match);
    assert_eq!(result.similarity_score, LEARNED_TANIMOTO);
    assert_eq!(result.disputed().count(), 0);
    assert_eq!(result.markush_string, markush.core_smiles);
}

#[tokio::test]
async fn thiophene_query_maps_b5_to_thiophene() {
    let markush = case_study_markush().await;
    let result = SubstituentMatcher::default()
        .match_substituents(SAMPLE_PROTECTED_MOLECULE, &markush).await
        .unwrap();

    assert_eq!(result.r_group_mapping["B[5]"], "c1cccs1");
    assert_eq!(result.analysis("B[5]").unwrap().description, "Thiophene ring");
}

#[tokio::test]
async fn unrecognised_ring_leaves_b5_empty() {
    let markush = case_study_markush().await;
    let result = SubstituentMatcher::default().match_substituents("CCO", &markush).await.unwrap();

    // The key is kept so downstream steps see the gap
    assert_eq!(result.r_group_mapping.get("B[5]").map(String::as_str), Some(""));
    assert_eq!(result.analysis("B[5]").unwrap().status, MatchStatus::Missing);
    assert_eq!(result.disputed().count(), 1);
    assert!(result.verification_notes.contains("B[5]"));
    assert_eq!(result.r_group_mapping["D[1]"], "c1ccccn1");
}

#[tokio::test]
async fn disagreement_is_flagged_not_hidden() {
    let markush = case_study_markush().await;
    let matcher = SubstituentMatcher::new(Arc::new(RuleBasedEstimator), Arc::new(PhenylEstimator));
    let result = matcher.match_substituents(SAMPLE_PROTECTED_MOLECULE, &markush).await.unwrap();

    let b5 = result.analysis("B[5]").unwrap();
    assert_eq!(b5.status, MatchStatus::Disputed);
    assert_eq!(b5.verified_value, "c1cccs1");
    assert_eq!(b5.learned_value.as_deref(), Some("c1ccccc1"));

    assert_eq!(result.analysis("D[1]").unwrap().status, MatchStatus::Agreed);
    assert_eq!(result.analysis("B[3]").unwrap().status, MatchStatus::RuleBasedOnly);
    assert!(!result.skeleton_match);
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let markush = case_study_markush().await;
    let err = SubstituentMatcher::default().match_substituents("   ", &markush).await.unwrap_err();
    assert!(matches!(err, PatentError::MatchingError(_)));
}

#[tokio::test]
async fn estimator_failure_propagates() {
    let markush = case_study_markush().await;
    let matcher = SubstituentMatcher::new(Arc::new(BrokenEstimator), Arc::new(LearnedEstimator));
    let err = matcher.match_substituents(SAMPLE_QUERY_MOLECULE, &markush).await.unwrap_err();
    assert!(err.to_string().contains("model weights not loaded"));
}
