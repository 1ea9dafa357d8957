use async_trait::async_trait;

use crate::errors::PatentResult;
use crate::models::markush::MarkushStructure;
use crate::models::matching::{ EstimatorKind, EstimatorOutput };

/// One independent substituent estimator.
///
/// Given a query molecule and a Markush structure, reports which fragment
/// occupies each R-group position. Groups the estimator cannot assign are
/// left out of the mapping; the matcher fills the gap.
#[async_trait]
pub trait SubstituentMatchingService: Send + Sync {
    fn kind(&self) -> EstimatorKind;

    async fn estimate(
        &self,
        query_molecule: &str,
        markush: &MarkushStructure
    ) -> PatentResult<EstimatorOutput>;
}
