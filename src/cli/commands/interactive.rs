use anyhow::Result;

use patentfinder::models::report::AssessmentRequest;
use patentfinder::ClientConfig;

use crate::cli::commands::{ assess, read_patent, OutputFormat };
use crate::cli::ui;

/// Collect both inputs from a terminal form, then run the assessment
pub async fn execute(config: &ClientConfig, stream: bool) -> Result<()> {
    ui::print_header("PatentFinder");
    ui::print_info("Enter a query molecule and patent claim text, or pick a bundled sample.");

    let query_molecule = match ui::select_molecule()? {
        Some(sample) => {
            ui::print_result("Query molecule", sample.smiles());
            sample.smiles().to_string()
        }
        None => ui::input_text("Query molecule (SMILES)", None)?,
    };

    let patent_text = if ui::confirm("Use the bundled sample patent claim?", true)? {
        read_patent(None, None)?
    } else {
        ui::input_text("Patent claim text", None)?
    };

    let request = AssessmentRequest::new(query_molecule, patent_text);
    if let Err(e) = request.validate() {
        ui::print_warning(&e.to_string());
        return Ok(());
    }

    assess::execute(config, request, stream, None, OutputFormat::Text).await
}
