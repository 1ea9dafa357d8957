use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{ debug, info };

use crate::errors::PatentResult;
use crate::implementations::smiles::ExtendedSmiles;
use crate::models::markush::{ MarkushStructure, SubstituentPosition };
use crate::samples::SAMPLE_CORE_MARKUSH;
use crate::traits::MarkushParsingService;

/// Returns the case-study Markush structure regardless of input.
///
/// Stands in for an image-to-SMILES parser over the patent document. The
/// substituent positions are read from the core's extended-SMILES extension.
#[derive(Debug, Clone)]
pub struct StaticMarkushParser {
    core_smiles: String,
    claim_requirements: BTreeMap<String, String>,
    relevant_block_indices: Vec<usize>,
}

impl Default for StaticMarkushParser {
    fn default() -> Self {
        let claim_requirements = [
            ("B[5]", "optionally substituted thiophenyl"),
            ("B[3]", "H or optionally substituted alkyl"),
            ("D[1]", "optionally substituted aryl"),
            ("R[21]", "independently H or CH3"),
            ("R[22]", "independently H or CH3"),
        ]
            .into_iter()
            .map(|(group, text)| (group.to_string(), text.to_string()))
            .collect();

        Self {
            core_smiles: SAMPLE_CORE_MARKUSH.to_string(),
            claim_requirements,
            relevant_block_indices: vec![60, 88],
        }
    }
}

#[async_trait]
impl MarkushParsingService for StaticMarkushParser {
    fn name(&self) -> &str {
        "static case-study parser"
    }

    async fn parse(&self, patent_text: &str) -> PatentResult<MarkushStructure> {
        debug!("Ignoring {} characters of patent text; returning case-study structure", patent_text.len());

        let parsed = ExtendedSmiles::parse(&self.core_smiles)?;
        let substituent_positions = parsed
            .atom_labels()
            .map(|tag| SubstituentPosition {
                atom_index: tag.index,
                group_id: tag.label.clone(),
                description: format!("Attachment point of substituent {}", tag.label),
            })
            .collect();

        Ok(MarkushStructure {
            core_smiles: self.core_smiles.clone(),
            substituent_positions,
            claim_requirements: self.claim_requirements.clone(),
            relevant_block_indices: self.relevant_block_indices.clone(),
        })
    }
}

/// Step 1 of the pipeline
#[derive(Clone)]
pub struct MarkushExtractor {
    parser: Arc<dyn MarkushParsingService>,
}

impl MarkushExtractor {
    pub fn new(parser: Arc<dyn MarkushParsingService>) -> Self {
        Self { parser }
    }

    pub async fn extract(&self, patent_text: &str) -> PatentResult<MarkushStructure> {
        info!("Extracting Markush structure with {}", self.parser.name());
        let structure = self.parser.parse(patent_text).await?;
        info!(
            "Extracted core with {} attachment points and {} claim requirements",
            structure.substituent_positions.len(),
            structure.claim_requirements.len()
        );
        Ok(structure)
    }
}

impl Default for MarkushExtractor {
    fn default() -> Self {
        Self::new(Arc::new(StaticMarkushParser::default()))
    }
}
