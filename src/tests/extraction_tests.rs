use crate::implementations::markush_extractor::MarkushExtractor;
use crate::implementations::smiles::{
    canonical_group_id,
    describe_fragment,
    fragments_equivalent,
    ExtendedSmiles,
    FragmentSignature,
    TagKind,
};
use crate::samples::{ SampleMolecule, SAMPLE_CORE_MARKUSH, SAMPLE_PATENT_CLAIM, SAMPLE_QUERY_MOLECULE };

#[test]
fn parses_case_study_core() {
    let parsed = ExtendedSmiles::parse(SAMPLE_CORE_MARKUSH).unwrap();
    assert_eq!(parsed.smiles, "*CN(*)CCC1(*)CC(*)(*)OC2(CCCC2)C1");

    let labels: Vec<(usize, &str)> = parsed
        .atom_labels()
        .map(|t| (t.index, t.label.as_str()))
        .collect();
    assert_eq!(labels, vec![(0, "B[5]"), (3, "B[3]"), (7, "D[1]"), (10, "R[21]"), (11, "R[22]")]);
}

#[test]
fn ring_and_dummy_tags_are_kept() {
    let parsed = ExtendedSmiles::parse("*C1SC=CC=1<sep><a>0:<dum></a><r>0:R[23]</r><r>0:R30</r>").unwrap();
    assert_eq!(parsed.tags.len(), 3);
    assert_eq!(parsed.tags[0].label, "<dum>");
    assert_eq!(parsed.tags[1].kind, TagKind::Ring);
    assert_eq!(parsed.tags[2].label, "R[30]");
    assert_eq!(parsed.atom_labels().count(), 1);
}

#[test]
fn plain_smiles_has_no_tags() {
    let parsed = ExtendedSmiles::parse("c1ccccc1").unwrap();
    assert!(parsed.tags.is_empty());
}

#[test]
fn malformed_extensions_are_rejected() {
    assert!(ExtendedSmiles::parse("<sep><a>0:B[5]</a>").is_err());
    assert!(ExtendedSmiles::parse("*C<sep><x>0:B[5]</x>").is_err());
    assert!(ExtendedSmiles::parse("*C<sep><a>0:B[5]").is_err());
    assert!(ExtendedSmiles::parse("*C<sep><a>zero:B[5]</a>").is_err());
    assert!(ExtendedSmiles::parse("*C<sep><a>B[5]</a>").is_err());
}

#[test]
fn group_ids_are_canonicalised() {
    assert_eq!(canonical_group_id("B5"), "B[5]");
    assert_eq!(canonical_group_id("B[5]"), "B[5]");
    assert_eq!(canonical_group_id("R21"), "R[21]");
    assert_eq!(canonical_group_id(" D1 "), "D[1]");
    // Labels without an index are left alone
    assert_eq!(canonical_group_id("B"), "B");
}

#[test]
fn fragment_signatures_see_through_notation() {
    assert!(fragments_equivalent("c1ccnnc1", "CC1C=NN=CC=1"));
    assert!(fragments_equivalent("c1cccs1", "C1=CSC=C1"));
    assert!(fragments_equivalent("c1ccccn1", "C1N=CC=CC=1"));
    assert!(fragments_equivalent("[H][H]", "[H]"));

    assert!(!fragments_equivalent("c1cccs1", "c1ccnnc1"));
    assert!(!fragments_equivalent("[H]", "C"));
    assert!(!fragments_equivalent("", "C"));

    let chloro = FragmentSignature::of("Clc1ccccc1");
    assert_eq!(chloro.heteroatoms.get("Cl"), Some(&1));
    assert_eq!(chloro.heavy_atoms, 7);
}

#[test]
fn fragments_get_short_names() {
    assert_eq!(describe_fragment("c1cccs1"), "Thiophene ring");
    assert_eq!(describe_fragment("CC1C=NN=CC=1"), "Pyridazine ring");
    assert_eq!(describe_fragment("c1ccccn1"), "Pyridine ring");
    assert_eq!(describe_fragment("[H][H]"), "Hydrogen");
    assert_eq!(describe_fragment("C"), "Methyl");
    assert_eq!(describe_fragment(""), "No assignment");
}

#[test]
fn samples_are_identified() {
    assert_eq!(SampleMolecule::identify(SAMPLE_QUERY_MOLECULE), Some(SampleMolecule::NotProtected));
    assert_eq!(
        SampleMolecule::identify(SampleMolecule::Protected.smiles()),
        Some(SampleMolecule::Protected)
    );
    assert_eq!(SampleMolecule::identify("CCO"), None);
}

#[tokio::test]
async fn extractor_returns_case_study_structure() {
    let markush = MarkushExtractor::default().extract(SAMPLE_PATENT_CLAIM).await.unwrap();

    assert_eq!(markush.core_smiles, SAMPLE_CORE_MARKUSH);
    assert_eq!(markush.relevant_block_indices, vec![60, 88]);
    let groups: Vec<&str> = markush.group_ids().collect();
    assert_eq!(groups, vec!["B[3]", "B[5]", "D[1]", "R[21]", "R[22]"]);
    assert_eq!(markush.requirement("B[5]"), Some("optionally substituted thiophenyl"));
    assert_eq!(markush.position("D[1]").map(|p| p.atom_index), Some(7));

    // Every claimed group has an attachment point in the core
    for group in markush.group_ids() {
        assert!(markush.position(group).is_some(), "no position for {}", group);
    }
}

#[tokio::test]
async fn extractor_is_deterministic_and_ignores_input() {
    let extractor = MarkushExtractor::default();
    let first = extractor.extract(SAMPLE_PATENT_CLAIM).await.unwrap();
    let second = extractor.extract(SAMPLE_PATENT_CLAIM).await.unwrap();
    let unrelated = extractor.extract("A claim about something else entirely.").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, unrelated);
}
