use async_trait::async_trait;

use crate::errors::PatentResult;
use crate::models::markush::MarkushStructure;

/// Turns patent claim text (and, in a full system, structure diagrams) into a Markush structure
#[async_trait]
pub trait MarkushParsingService: Send + Sync {
    /// Name of the parsing backend
    fn name(&self) -> &str;

    /// Parse the patent text. Must be deterministic for a given input.
    async fn parse(&self, patent_text: &str) -> PatentResult<MarkushStructure>;
}
