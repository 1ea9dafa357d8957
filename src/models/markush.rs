use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;

/// A labelled attachment point in a Markush core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituentPosition {
    /// Index of the attachment atom in the core SMILES
    pub atom_index: usize,
    /// Canonical group id, e.g. `B[5]`
    pub group_id: String,
    pub description: String,
}

/// Generic chemical claim structure extracted from a patent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkushStructure {
    /// Core scaffold in extended SMILES (`SMILES<sep>EXTENSION`)
    pub core_smiles: String,
    /// Attachment points in the order they appear in the extension
    pub substituent_positions: Vec<SubstituentPosition>,
    /// Requirement text per canonical group id
    pub claim_requirements: BTreeMap<String, String>,
    /// Indices of the patent text blocks the structure was read from
    pub relevant_block_indices: Vec<usize>,
}

impl MarkushStructure {
    /// Group ids the claim places requirements on
    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.claim_requirements.keys().map(String::as_str)
    }

    pub fn requirement(&self, group_id: &str) -> Option<&str> {
        self.claim_requirements.get(group_id).map(String::as_str)
    }

    pub fn position(&self, group_id: &str) -> Option<&SubstituentPosition> {
        self.substituent_positions.iter().find(|p| p.group_id == group_id)
    }
}
