use anyhow::Result;

use patentfinder::models::report::AssessmentRequest;
use patentfinder::{ MarkushExtractor, SubstituentMatcher };

use crate::cli::commands::OutputFormat;
use crate::cli::ui;

/// Steps 1 and 2: no model calls
pub async fn execute(request: AssessmentRequest, format: OutputFormat) -> Result<()> {
    if let Err(e) = request.validate() {
        ui::print_error(&e.to_string());
        return Err(e.into());
    }

    let markush = MarkushExtractor::default().extract(&request.patent_text).await?;
    let result = SubstituentMatcher::default()
        .match_substituents(&request.query_molecule, &markush).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            ui::print_header("Substituent Matching");
            ui::print_result("Query molecule", &request.query_molecule);
            println!();
            ui::display_match(&result);
            if result.disputed().next().is_some() {
                ui::print_warning("Some groups need adjudication by the requirements examiner");
            }
        }
    }
    Ok(())
}
