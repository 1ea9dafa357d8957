use anyhow::Result;
use std::path::Path;

use patentfinder::MarkushExtractor;

use crate::cli::commands::{ read_patent, OutputFormat };
use crate::cli::ui;

/// Step 1 only
pub async fn execute(patent_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let patent_text = read_patent(patent_path, None)?;
    let markush = MarkushExtractor::default().extract(&patent_text).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&markush)?),
        OutputFormat::Text => {
            ui::print_header("Markush Extraction");
            ui::display_markush(&markush);
        }
    }
    Ok(())
}
